use thiserror::Error;

#[derive(Debug, Error)]
pub enum TuiError {
    #[error("Terminal error: {0}")]
    Terminal(#[from] std::io::Error),

    #[error(
        "Terminal size too small. Current: {width}x{height}, Minimum required: {min_width}x{min_height}. Please resize your terminal window."
    )]
    TooSmall {
        width: u16,
        height: u16,
        min_width: u16,
        min_height: u16,
    },
}
