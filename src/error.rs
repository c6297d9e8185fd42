use thiserror::Error;

#[derive(Error, Debug)]
pub enum FrameKitError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Zip archive error: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("File not found: {0}")]
    FileNotFound(String),

    #[error("Command '{command}' returned with error (code {}): {output}", format_code(.code))]
    ToolFailed {
        command: String,
        code: Option<i32>,
        output: String,
    },

    #[error("Media processing error: {0}")]
    Media(String),

    #[error("Could not read duration of {path}: '{output}' is not a number")]
    ProbeParse { path: String, output: String },

    #[error("Configuration error: {0}")]
    Config(String),
}

fn format_code(code: &Option<i32>) -> String {
    match code {
        Some(code) => code.to_string(),
        None => "signal".to_string(),
    }
}

pub type Result<T> = std::result::Result<T, FrameKitError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tool_failed_message() {
        let err = FrameKitError::ToolFailed {
            command: "ffmpeg -i in.mp4 out.gif".to_string(),
            code: Some(1),
            output: "Invalid data found".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Command 'ffmpeg -i in.mp4 out.gif' returned with error (code 1): Invalid data found"
        );

        let killed = FrameKitError::ToolFailed {
            command: "ffmpeg".to_string(),
            code: None,
            output: String::new(),
        };
        assert!(killed.to_string().contains("(code signal)"));
    }
}
