/// Cloud-cover estimation from a camera.
///
/// Only the placeholder exists today; a real estimator becomes another variant
/// without changing what the reporter asks of it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Camera {
    Placeholder,
}

impl Camera {
    /// Line announced once at startup
    pub fn setup_line(&self) -> String {
        match self {
            Camera::Placeholder => "Camera module setup placeholder...".to_string(),
        }
    }

    /// Line closing every report
    pub fn report_line(&mut self) -> String {
        match self {
            Camera::Placeholder => "Camera: Cloud cover estimation logic to be added.".to_string(),
        }
    }
}

impl Default for Camera {
    fn default() -> Self {
        Camera::Placeholder
    }
}
