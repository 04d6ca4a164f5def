//! Operation parsing for CLI flags.

use pixelbench_core::{FilterSpec, Operation};

/// Map the `--operation` flag (plus its parameter flags) to an operation.
pub fn parse_operation(
    name: &str,
    sigma: f32,
    kernel: Option<&str>,
) -> Result<Operation, String> {
    match name {
        "grayscale" => Ok(Operation::Grayscale),
        "edges" => Ok(Operation::EdgeDetect),
        "blur" => Ok(Operation::GaussianBlur { sigma }),
        "convolve" => {
            let kernel = kernel.ok_or("--kernel is required for the convolve operation")?;
            parse_kernel(kernel).map(Operation::Convolve)
        }
        other => Err(format!(
            "Unknown operation '{}' (expected grayscale, edges, blur, or convolve)",
            other
        )),
    }
}

/// Built-in convolution kernels.
fn parse_kernel(name: &str) -> Result<FilterSpec, String> {
    match name {
        "sharpen" => Ok(FilterSpec::sharpen()),
        "box3" => FilterSpec::box_filter(3).map_err(|e| e.to_string()),
        "box5" => FilterSpec::box_filter(5).map_err(|e| e.to_string()),
        other => Err(format!(
            "Unknown kernel '{}' (expected sharpen, box3, or box5)",
            other
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_known_operations() {
        assert!(matches!(
            parse_operation("edges", 1.0, None),
            Ok(Operation::EdgeDetect)
        ));
        assert!(matches!(
            parse_operation("blur", 2.5, None),
            Ok(Operation::GaussianBlur { .. })
        ));
        assert!(matches!(
            parse_operation("convolve", 1.0, Some("sharpen")),
            Ok(Operation::Convolve(_))
        ));
    }

    #[test]
    fn convolve_requires_a_kernel() {
        assert!(parse_operation("convolve", 1.0, None).is_err());
    }

    #[test]
    fn unknown_names_are_rejected() {
        assert!(parse_operation("emboss", 1.0, None).is_err());
        assert!(parse_operation("convolve", 1.0, Some("laplace")).is_err());
    }
}
