pub mod completion;
pub mod recipe;
pub mod staging;

// Re-export wire types for easy access
pub use completion::{StagingTaskAnnotation, TaskCompletion};
pub use recipe::{Action, ActionGraph, ProgressMessages, ResourceLimits, Step, TaskRecipe};
pub use staging::{
    Buildpack, BuildpackStagingData, BuildpackStagingResult, DockerStagingData,
    DockerStagingResult, EnvironmentVariable, StagingRequest, StagingResponse,
    StopStagingRequest,
};
