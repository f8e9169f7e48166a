use thiserror::Error;

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum FramingProblem {
    MissingOpeningDelimiter,
    MissingClosingDelimiter,
    UnexpectedEpilogue,
    MissingHeaderTerminator,
    MalformedHeaderLine,
    NonCanonicalHeaderLine,
    NonTextHeaders,
}

impl FramingProblem {
    fn description(self) -> &'static str {
        match self {
            FramingProblem::MissingOpeningDelimiter => "the body doesn't start with the boundary",
            FramingProblem::MissingClosingDelimiter => "the closing boundary is missing",
            FramingProblem::UnexpectedEpilogue => "unexpected content after the closing boundary",
            FramingProblem::MissingHeaderTerminator => "part headers aren't followed by a blank line",
            FramingProblem::MalformedHeaderLine => "a part header line has no colon",
            FramingProblem::NonCanonicalHeaderLine => {
                "a part header line wouldn't be reproduced byte for byte"
            }
            FramingProblem::NonTextHeaders => "part headers aren't valid UTF-8",
        }
    }
}

#[derive(Debug, Error)]
pub enum MultipartError {
    #[error("The multipart boundary is empty")]
    EmptyBoundary,
    #[error("Multipart framing is invalid in part {part}: {}", .problem.description())]
    InvalidFraming {
        part: usize,
        problem: FramingProblem,
    },
    #[error("Recorded multipart part {part} is invalid: {reason}")]
    InvalidPart { part: usize, reason: String },
}
