use std::{fmt, path::PathBuf, str::FromStr};

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown {kind} '{value}', expected one of: {expected}")]
pub struct ParseEnumError {
    kind: &'static str,
    value: String,
    expected: &'static str,
}

impl ParseEnumError {
    fn new(kind: &'static str, value: &str, expected: &'static str) -> Self {
        Self {
            kind,
            value: value.to_string(),
            expected,
        }
    }
}

/// Volume-to-surface mapping method understood by `wb_command`.
///
/// `Trilinear` performs 3D linear interpolation, `Enclosing` takes the value of
/// the voxel the vertex lies inside, and `Cubic` uses cubic splines.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum MappingMethod {
    #[default]
    Trilinear,
    Enclosing,
    Cubic,
}

impl MappingMethod {
    pub fn name(self) -> &'static str {
        match self {
            MappingMethod::Trilinear => "trilinear",
            MappingMethod::Enclosing => "enclosing",
            MappingMethod::Cubic => "cubic",
        }
    }

    pub fn flag(self) -> String {
        format!("-{}", self.name())
    }
}

impl fmt::Display for MappingMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for MappingMethod {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "trilinear" => Ok(MappingMethod::Trilinear),
            "enclosing" => Ok(MappingMethod::Enclosing),
            "cubic" => Ok(MappingMethod::Cubic),
            _ => Err(ParseEnumError::new(
                "mapping method",
                s,
                "trilinear, enclosing, cubic",
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Hemisphere {
    Left,
    Right,
}

impl Hemisphere {
    pub fn code(self) -> &'static str {
        match self {
            Hemisphere::Left => "lh",
            Hemisphere::Right => "rh",
        }
    }
}

impl FromStr for Hemisphere {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "lh" | "left" => Ok(Hemisphere::Left),
            "rh" | "right" => Ok(Hemisphere::Right),
            _ => Err(ParseEnumError::new("hemisphere", s, "lh, rh")),
        }
    }
}

/// How FreeSurfer aligns the input volume with the subject's anatomy.
#[derive(Debug, Clone, PartialEq)]
pub enum Registration {
    /// Use the scanner header geometry of the named subject.
    Header { subject: String },
    /// Use an explicit registration file (`register.dat`, `.lta`).
    File(PathBuf),
    /// The volume is already in MNI152 space.
    Mni152,
}

impl Registration {
    pub fn arguments(&self) -> Vec<String> {
        match self {
            Registration::Header { subject } => vec!["--regheader".into(), subject.clone()],
            Registration::File(path) => vec!["--reg".into(), path.display().to_string()],
            Registration::Mni152 => vec!["--mni152reg".into()],
        }
    }
}

/// Whether projection distances are a fraction of cortical thickness or
/// absolute millimetres.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ProjectionMethod {
    #[default]
    Frac,
    Dist,
}

impl FromStr for ProjectionMethod {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "frac" => Ok(ProjectionMethod::Frac),
            "dist" => Ok(ProjectionMethod::Dist),
            _ => Err(ParseEnumError::new("projection method", s, "frac, dist")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ProjectionSummary {
    /// Sample a single depth.
    Point(f64),
    /// Average samples from `min` to `max` in steps of `delta`.
    Average { min: f64, max: f64, delta: f64 },
    /// Take the maximum of samples from `min` to `max` in steps of `delta`.
    Maximum { min: f64, max: f64, delta: f64 },
}

impl Default for ProjectionSummary {
    fn default() -> Self {
        ProjectionSummary::Point(0.5)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Projection {
    pub method: ProjectionMethod,
    pub summary: ProjectionSummary,
}

impl Projection {
    pub fn new(method: ProjectionMethod, summary: ProjectionSummary) -> Self {
        Self { method, summary }
    }

    pub fn arguments(&self) -> Vec<String> {
        let base = match self.method {
            ProjectionMethod::Frac => "--projfrac",
            ProjectionMethod::Dist => "--projdist",
        };
        match self.summary {
            ProjectionSummary::Point(value) => vec![base.to_string(), value.to_string()],
            ProjectionSummary::Average { min, max, delta } => vec![
                format!("{base}-avg"),
                min.to_string(),
                max.to_string(),
                delta.to_string(),
            ],
            ProjectionSummary::Maximum { min, max, delta } => vec![
                format!("{base}-max"),
                min.to_string(),
                max.to_string(),
                delta.to_string(),
            ],
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SurfaceInterpolation {
    #[default]
    Nearest,
    Trilinear,
}

impl SurfaceInterpolation {
    pub fn name(self) -> &'static str {
        match self {
            SurfaceInterpolation::Nearest => "nearest",
            SurfaceInterpolation::Trilinear => "trilinear",
        }
    }
}

impl FromStr for SurfaceInterpolation {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "nearest" => Ok(SurfaceInterpolation::Nearest),
            "trilinear" => Ok(SurfaceInterpolation::Trilinear),
            _ => Err(ParseEnumError::new(
                "interpolation",
                s,
                "nearest, trilinear",
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mapping_method_flags() {
        assert_eq!(MappingMethod::default().flag(), "-trilinear");
        assert_eq!(MappingMethod::Enclosing.flag(), "-enclosing");
        assert_eq!("CUBIC".parse::<MappingMethod>(), Ok(MappingMethod::Cubic));
        assert!("nearest".parse::<MappingMethod>().is_err());
    }

    #[test]
    fn projection_flags_combine_method_and_summary() {
        assert_eq!(Projection::default().arguments(), vec!["--projfrac", "0.5"]);

        let avg = Projection::new(
            ProjectionMethod::Dist,
            ProjectionSummary::Average {
                min: -1.0,
                max: 2.0,
                delta: 0.5,
            },
        );
        assert_eq!(avg.arguments(), vec!["--projdist-avg", "-1", "2", "0.5"]);

        let max = Projection::new(
            ProjectionMethod::Frac,
            ProjectionSummary::Maximum {
                min: 0.0,
                max: 1.0,
                delta: 0.1,
            },
        );
        assert_eq!(max.arguments(), vec!["--projfrac-max", "0", "1", "0.1"]);
    }

    #[test]
    fn registration_arguments() {
        let header = Registration::Header {
            subject: "bert".into(),
        };
        assert_eq!(header.arguments(), vec!["--regheader", "bert"]);
        assert_eq!(
            Registration::File(PathBuf::from("reg/register.dat")).arguments(),
            vec!["--reg", "reg/register.dat"]
        );
        assert_eq!(Registration::Mni152.arguments(), vec!["--mni152reg"]);
    }

    #[test]
    fn hemisphere_parses_long_and_short_names() {
        assert_eq!("left".parse::<Hemisphere>(), Ok(Hemisphere::Left));
        assert_eq!("RH".parse::<Hemisphere>().map(Hemisphere::code), Ok("rh"));
    }
}
