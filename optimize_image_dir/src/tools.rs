//! External tools the optimizer shells out to

pub const CONVERT: &str = "convert";
pub const PNGQUANT: &str = "pngquant";
pub const JPEGOPTIM: &str = "jpegoptim";

/// Checked on `PATH` before a walk starts.
pub const REQUIRED_TOOLS: &[&str] = &[CONVERT, PNGQUANT, JPEGOPTIM];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_required_tools_cover_every_tool() {
        for tool in [CONVERT, PNGQUANT, JPEGOPTIM] {
            assert!(REQUIRED_TOOLS.contains(&tool), "{}", tool);
        }
        assert_eq!(REQUIRED_TOOLS.len(), 3);
    }
}
