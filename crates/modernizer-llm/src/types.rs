/// A single piece of a streamed model response
#[derive(Debug, Clone, PartialEq)]
pub enum LLMChunk {
    Token(String),
    Done,
}
