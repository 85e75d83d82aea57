use crate::core::io::poscar::{PoscarError, PoscarParseErrorKind, parse_float, parse_vector};
use crate::core::models::lattice::{Lattice, LatticeError};
use crate::core::models::structure::{SpeciesGroup, Structure};
use nalgebra::{Matrix3, RowVector3, Vector3};
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum XdatcarError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("Parse error on line {line}: {kind}")]
    Parse {
        line: usize,
        kind: PoscarParseErrorKind,
    },
    #[error("Trajectory contains no 'Direct configuration=' frames")]
    NoFrames,
    #[error(transparent)]
    Lattice(#[from] LatticeError),
}

impl From<PoscarError> for XdatcarError {
    fn from(err: PoscarError) -> Self {
        match err {
            PoscarError::Io(e) => XdatcarError::Io(e),
            PoscarError::Parse { line, kind } => XdatcarError::Parse { line, kind },
            PoscarError::Lattice(e) => XdatcarError::Lattice(e),
            // XDATCAR frame headers replace the POSCAR mode line, so this
            // variant cannot come back out of the shared helpers.
            PoscarError::UnsupportedCoordinateMode { line, .. } => XdatcarError::Parse {
                line,
                kind: PoscarParseErrorKind::UnexpectedEof {
                    expected: "Direct configuration header".to_string(),
                },
            },
        }
    }
}

/// One ionic-step snapshot inside a trajectory.
///
/// Sites are stored flat, in the species block order declared by the header;
/// [`Trajectory::frame_structure`] regroups them per species.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    /// Ionic step number from the `Direct configuration=` header.
    pub step: u64,
    pub sites: Vec<Vector3<f64>>,
}

/// An ab-initio molecular dynamics trajectory read from a VASP XDATCAR file.
#[derive(Debug, Clone, PartialEq)]
pub struct Trajectory {
    pub title: String,
    pub lattice: Lattice,
    pub scale: f64,
    pub species: Vec<String>,
    pub counts: Vec<usize>,
    pub frames: Vec<Frame>,
}

impl Trajectory {
    pub fn total_atoms(&self) -> usize {
        self.counts.iter().sum()
    }

    /// Simulation time of every frame in picoseconds, given the ionic time
    /// step POTIM in femtoseconds.
    pub fn times_ps(&self, potim_fs: f64) -> Vec<f64> {
        self.frames
            .iter()
            .map(|f| f.step as f64 * potim_fs / 1000.0)
            .collect()
    }

    /// Rebuilds frame `index` as a standalone [`Structure`], regrouping the
    /// flat site list into per-species groups.
    pub fn frame_structure(&self, index: usize) -> Option<Structure> {
        let frame = self.frames.get(index)?;
        let mut groups = Vec::with_capacity(self.species.len());
        let mut cursor = 0;
        for (label, count) in self.species.iter().zip(&self.counts) {
            let sites = frame.sites.get(cursor..cursor + count)?.to_vec();
            groups.push(SpeciesGroup::new(label.clone(), sites));
            cursor += count;
        }
        Some(Structure::new(self.lattice.clone(), self.scale, groups))
    }
}

/// VASP XDATCAR trajectory files: a POSCAR-like header followed by repeated
/// `Direct configuration=  N` blocks of fractional coordinates.
pub struct XdatcarFile;

impl XdatcarFile {
    pub fn read_from(reader: &mut impl BufRead) -> Result<Trajectory, XdatcarError> {
        let lines: Vec<String> = reader.lines().collect::<Result<_, _>>()?;
        let line = |idx: usize, expected: &str| -> Result<&str, XdatcarError> {
            lines.get(idx).map(String::as_str).ok_or(XdatcarError::Parse {
                line: idx + 1,
                kind: PoscarParseErrorKind::UnexpectedEof {
                    expected: expected.to_string(),
                },
            })
        };

        let title = line(0, "title line")?.trim().to_string();
        let scale = parse_float(line(1, "scaling factor")?.trim(), 2)?;
        let mut rows = [RowVector3::zeros(); 3];
        for (axis, row) in rows.iter_mut().enumerate() {
            let v = parse_vector(line(2 + axis, "lattice vector")?, 3 + axis)?;
            *row = v.transpose() * scale;
        }
        let lattice = Lattice::new(Matrix3::from_rows(&rows))?;

        let species: Vec<String> = line(5, "species labels")?
            .split_whitespace()
            .map(str::to_string)
            .collect();
        let counts: Vec<usize> = line(6, "species counts")?
            .split_whitespace()
            .map(|field| {
                field.parse().map_err(|_| XdatcarError::Parse {
                    line: 7,
                    kind: PoscarParseErrorKind::InvalidInt {
                        value: field.to_string(),
                    },
                })
            })
            .collect::<Result<_, _>>()?;
        if species.len() != counts.len() || species.is_empty() {
            return Err(XdatcarError::Parse {
                line: 7,
                kind: PoscarParseErrorKind::SpeciesCountMismatch {
                    species: species.len(),
                    counts: counts.len(),
                },
            });
        }
        let total_atoms: usize = counts.iter().sum();

        let mut frames = Vec::new();
        let mut cursor = 7;
        while cursor < lines.len() {
            let header = lines[cursor].trim();
            if header.is_empty() {
                cursor += 1;
                continue;
            }
            let step_field = header
                .strip_prefix("Direct configuration=")
                .map(str::trim)
                .ok_or_else(|| XdatcarError::Parse {
                    line: cursor + 1,
                    kind: PoscarParseErrorKind::UnexpectedEof {
                        expected: "'Direct configuration=' frame header".to_string(),
                    },
                })?;
            let step: u64 = step_field.parse().map_err(|_| XdatcarError::Parse {
                line: cursor + 1,
                kind: PoscarParseErrorKind::InvalidInt {
                    value: step_field.to_string(),
                },
            })?;
            cursor += 1;

            let mut sites = Vec::with_capacity(total_atoms);
            for _ in 0..total_atoms {
                let content = line(cursor, "frame coordinate line")?;
                sites.push(parse_vector(content, cursor + 1)?);
                cursor += 1;
            }
            frames.push(Frame { step, sites });
        }

        if frames.is_empty() {
            return Err(XdatcarError::NoFrames);
        }

        Ok(Trajectory {
            title,
            lattice,
            scale,
            species,
            counts,
            frames,
        })
    }

    pub fn read_from_path<P: AsRef<Path>>(path: P) -> Result<Trajectory, XdatcarError> {
        let file = File::open(path)?;
        let mut reader = BufReader::new(file);
        Self::read_from(&mut reader)
    }
}
