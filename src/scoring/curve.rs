use anyhow::{bail, Context, Result};
use std::fmt;

/// Piecewise-linear map from a normalized indicator in [0, 1] to a score in
/// [0, 100], written as `"x:y, x:y, ..."`.
#[derive(Debug, Clone, PartialEq)]
pub struct Curve {
    points: Vec<(f64, f64)>,
}

impl Curve {
    pub fn parse(s: &str) -> Result<Self> {
        let mut points = Vec::new();
        for part in s.split(',').map(str::trim).filter(|p| !p.is_empty()) {
            let Some((x, y)) = part.split_once(':') else {
                bail!("Breakpoint '{}' must be written as x:y", part);
            };
            let x: f64 = x
                .trim()
                .parse()
                .with_context(|| format!("Invalid x in breakpoint '{}'", part))?;
            let y: f64 = y
                .trim()
                .parse()
                .with_context(|| format!("Invalid y in breakpoint '{}'", part))?;

            if !(0.0..=1.0).contains(&x) {
                bail!("x must be within 0-1: {}", part);
            }
            if !(0.0..=100.0).contains(&y) {
                bail!("y must be within 0-100: {}", part);
            }
            if let Some((last_x, _)) = points.last() {
                if x <= *last_x {
                    bail!("x values must be strictly increasing: {}", part);
                }
            }
            points.push((x, y));
        }

        if points.len() < 2 {
            bail!("Curve needs at least two breakpoints");
        }
        Ok(Curve { points })
    }

    /// Evaluate at `x`. Outside the breakpoints the end values hold.
    pub fn eval(&self, x: f64) -> f64 {
        let (first_x, first_y) = self.points[0];
        let (last_x, last_y) = self.points[self.points.len() - 1];
        if x.is_nan() || x <= first_x {
            return first_y;
        }
        if x >= last_x {
            return last_y;
        }

        for pair in self.points.windows(2) {
            let ((x0, y0), (x1, y1)) = (pair[0], pair[1]);
            if x <= x1 {
                let t = (x - x0) / (x1 - x0);
                return y0 + (y1 - y0) * t;
            }
        }
        last_y
    }
}

impl fmt::Display for Curve {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.points.iter().map(|(x, y)| format!("{}:{}", x, y)).collect();
        f.write_str(&parts.join(", "))
    }
}
