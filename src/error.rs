use thiserror::Error;

#[derive(Debug, Error)]
pub enum OptimizeError {
    #[error("invalid template: {0}")]
    InvalidTemplate(String),

    #[error("infeasible assignment: {0}")]
    InfeasibleAssignment(String),
}
