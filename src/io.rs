//! Basis loading and result writing
//!
//! Text bases are line-oriented: every line that is not blank and does not
//! start with `#` or `B` contributes one row, read as the integers it
//! contains. Brackets and commas are ignored, so numpy-style dumps such as
//! `[[1, 2],` / ` [3, 4]]` load as they are. A file whose content parses as a
//! JSON array of integer arrays is read as JSON instead.

use crate::core::error::{LatticeError, Result};
use crate::core::lattice::Lattice;
use crate::core::types::LatticePoint;
use crate::sieve::SieveResult;
use serde::Serialize;
use std::path::Path;

/// Output formats for sieve results
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportFormat {
    /// `B =`, `u =`, `norm =`, `x =` blocks
    Plain,
    /// Pretty-printed JSON
    Json,
}

/// Parse a basis from JSON or line-oriented text
pub fn parse_basis(content: &str) -> Result<Lattice> {
    if let Ok(rows) = serde_json::from_str::<Vec<Vec<i64>>>(content) {
        return Lattice::from_matrix(rows);
    }

    let mut rows = Vec::new();
    for (line_no, line) in content.lines().enumerate() {
        let trimmed = line.trim_start();
        if trimmed.is_empty() || trimmed.starts_with('#') || trimmed.starts_with('B') {
            continue;
        }
        let row = parse_row(trimmed, line_no + 1)?;
        if !row.is_empty() {
            rows.push(row);
        }
    }

    if rows.is_empty() {
        return Err(LatticeError::parse_error("No basis rows found"));
    }
    Lattice::from_matrix(rows)
}

fn parse_row(line: &str, line_no: usize) -> Result<Vec<i64>> {
    line.split(|c: char| !(c.is_ascii_digit() || c == '-'))
        .filter(|token| !token.is_empty())
        .map(|token| {
            token.parse::<i64>().map_err(|e| {
                LatticeError::parse_error(format!("line {}: '{}': {}", line_no, token, e))
            })
        })
        .collect()
}

/// Load a basis file
pub fn load_basis<P: AsRef<Path>>(path: P) -> Result<Lattice> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path)
        .map_err(|e| LatticeError::io_error(format!("{}: {}", path.display(), e)))?;
    let lattice = parse_basis(&content)?;
    log::debug!(
        "Loaded {}x{} basis from {}",
        lattice.ambient_dimension(),
        lattice.rank(),
        path.display()
    );
    Ok(lattice)
}

/// Write a basis in the text format read by [`parse_basis`]
pub fn save_basis<P: AsRef<Path>>(lattice: &Lattice, path: P) -> Result<()> {
    let content = format!(
        "# lattice basis, {} rows x {} columns\nB =\n{}",
        lattice.ambient_dimension(),
        lattice.rank(),
        lattice
    );
    write_output(path, &content)
}

/// Render a short vector as `B =`, `u =`, `norm =`, `x =` blocks
pub fn format_point(lattice: &Lattice, point: &LatticePoint) -> String {
    format!(
        "B =\n{}\nu =\n{}\n\nnorm =\n{}\n\nx =\n{}\n",
        lattice,
        bracketed(point.image()),
        point.norm(),
        bracketed(point.coefficients())
    )
}

#[derive(Serialize)]
struct JsonReport<'a> {
    basis: Vec<Vec<i64>>,
    #[serde(flatten)]
    result: &'a SieveResult,
}

/// Render a sieve result
pub fn format_result(
    lattice: &Lattice,
    result: &SieveResult,
    format: ReportFormat,
) -> Result<String> {
    match format {
        ReportFormat::Plain => {
            let mut output = format!(
                "# status: {}\n# rounds: {}, candidates: {}, time: {:.3}s, seed: {}\n",
                result.status,
                result.rounds_completed,
                result.candidates_evaluated,
                result.execution_time,
                result.seed
            );
            if let Ok(bound) = lattice.minkowski_bound() {
                output.push_str(&format!("# minkowski bound: {:.4}\n", bound));
            }
            output.push('\n');
            output.push_str(&format_point(lattice, &result.shortest));
            Ok(output)
        }
        ReportFormat::Json => {
            let report = JsonReport {
                basis: lattice.basis().to_vec(),
                result,
            };
            Ok(serde_json::to_string_pretty(&report)?)
        }
    }
}

/// Write `content` to `path`
pub fn write_output<P: AsRef<Path>>(path: P, content: &str) -> Result<()> {
    let path = path.as_ref();
    std::fs::write(path, content)
        .map_err(|e| LatticeError::io_error(format!("{}: {}", path.display(), e)))
}

fn bracketed(values: &[i64]) -> String {
    format!(
        "[{}]",
        values.iter().map(|v| v.to_string()).collect::<Vec<_>>().join(", ")
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_parse_numpy_style_text() {
        let content =
            "# comment line\n# another\n\nB = [\n [3, -1, 0],\n [0, 4, 2],\n [1, 0, -7]]\n";
        let lattice = parse_basis(content).unwrap();
        assert_eq!(
            lattice.basis().to_vec(),
            vec![vec![3, -1, 0], vec![0, 4, 2], vec![1, 0, -7]]
        );
    }

    #[test]
    fn test_parse_json() {
        let lattice = parse_basis("[[1, 0], [0, -2]]").unwrap();
        assert_eq!(lattice.basis().to_vec(), vec![vec![1, 0], vec![0, -2]]);
    }

    #[test]
    fn test_parse_errors() {
        assert!(matches!(parse_basis("# nothing\n"), Err(LatticeError::Parse(_))));
        assert!(parse_basis("1 2\n3\n").is_err());
        assert!(matches!(parse_basis("1 2-3\n"), Err(LatticeError::Parse(_))));
    }

    #[test]
    fn test_save_then_load_file() {
        let lattice = Lattice::from_matrix(vec![vec![5, -2], vec![1, 9]]).unwrap();
        let file = NamedTempFile::new().unwrap();
        save_basis(&lattice, file.path()).unwrap();
        assert_eq!(load_basis(file.path()).unwrap(), lattice);
    }

    #[test]
    fn test_load_hand_written_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "# 2 x 2").unwrap();
        writeln!(file, "[[2, 0],").unwrap();
        writeln!(file, " [0, 3]]").unwrap();
        let lattice = load_basis(file.path()).unwrap();
        assert_eq!(lattice.rank(), 2);
        assert_eq!(lattice.basis().get_col(1).unwrap(), vec![0, 3]);
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("absent.txt");
        assert!(matches!(load_basis(&missing), Err(LatticeError::Io(_))));
    }

    #[test]
    fn test_format_point_layout() {
        let lattice = Lattice::from_matrix(vec![vec![1, 0], vec![0, 1]]).unwrap();
        let point = LatticePoint::new(&lattice, vec![1, -1]).unwrap();
        let text = format_point(&lattice, &point);
        assert!(text.starts_with("B =\n[[1, 0]\n [0, 1]]\n"));
        assert!(text.contains("u =\n[1, -1]\n"));
        assert!(text.contains("x =\n[1, -1]\n"));
        assert!(text.contains(&format!("norm =\n{}\n", 2.0f64.sqrt())));
    }
}
