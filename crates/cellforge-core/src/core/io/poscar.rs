use crate::core::io::traits::StructureFile;
use crate::core::models::lattice::{Lattice, LatticeError};
use crate::core::models::structure::{SpeciesGroup, Structure};
use nalgebra::{Matrix3, RowVector3, Vector3};
use std::io::{self, BufRead, Write};
use thiserror::Error;

/// Metadata carried alongside a parsed POSCAR: the free-text title line.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PoscarMetadata {
    pub title: String,
}

impl PoscarMetadata {
    pub fn titled(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
        }
    }
}

#[derive(Debug, Error)]
pub enum PoscarError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("Parse error on line {line}: {kind}")]
    Parse {
        line: usize,
        kind: PoscarParseErrorKind,
    },
    #[error(
        "Unsupported coordinate mode '{found}' on line {line}: only 'Direct' (fractional) coordinates are supported"
    )]
    UnsupportedCoordinateMode { line: usize, found: String },
    #[error(transparent)]
    Lattice(#[from] LatticeError),
}

#[derive(Debug, Error)]
pub enum PoscarParseErrorKind {
    #[error("Invalid float format (value: '{value}')")]
    InvalidFloat { value: String },
    #[error("Invalid integer format (value: '{value}')")]
    InvalidInt { value: String },
    #[error("Expected {expected} whitespace-separated fields, found {found}")]
    WrongFieldCount { expected: usize, found: usize },
    #[error("Species line declares {species} labels but counts line has {counts} entries")]
    SpeciesCountMismatch { species: usize, counts: usize },
    #[error("File ended early: expected {expected}")]
    UnexpectedEof { expected: String },
}

pub(crate) fn parse_float(value: &str, line: usize) -> Result<f64, PoscarError> {
    value.parse().map_err(|_| PoscarError::Parse {
        line,
        kind: PoscarParseErrorKind::InvalidFloat {
            value: value.to_string(),
        },
    })
}

/// Parses the first three whitespace-separated floats of a coordinate or
/// lattice-vector line. Extra trailing fields (velocities, site comments)
/// are ignored, matching VASP's own tolerance.
pub(crate) fn parse_vector(content: &str, line: usize) -> Result<Vector3<f64>, PoscarError> {
    let fields: Vec<&str> = content.split_whitespace().collect();
    if fields.len() < 3 {
        return Err(PoscarError::Parse {
            line,
            kind: PoscarParseErrorKind::WrongFieldCount {
                expected: 3,
                found: fields.len(),
            },
        });
    }
    Ok(Vector3::new(
        parse_float(fields[0], line)?,
        parse_float(fields[1], line)?,
        parse_float(fields[2], line)?,
    ))
}

/// VASP-5 POSCAR/CONTCAR structure files.
///
/// Layout: title, scalar scaling factor, three lattice vectors, species
/// labels, per-species atom counts, the literal coordinate mode `Direct`,
/// then one fractional coordinate triple per atom, grouped contiguously by
/// species in declaration order. The scaling factor is applied to the
/// lattice on read, so an in-memory [`Structure`] always carries rows in Å.
pub struct PoscarFile;

impl StructureFile for PoscarFile {
    type Metadata = PoscarMetadata;
    type Error = PoscarError;

    fn read_from(reader: &mut impl BufRead) -> Result<(Structure, Self::Metadata), Self::Error> {
        let lines: Vec<String> = reader.lines().collect::<Result<_, _>>()?;
        let line = |idx: usize, expected: &str| -> Result<&str, PoscarError> {
            lines.get(idx).map(String::as_str).ok_or(PoscarError::Parse {
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
                field.parse().map_err(|_| PoscarError::Parse {
                    line: 7,
                    kind: PoscarParseErrorKind::InvalidInt {
                        value: field.to_string(),
                    },
                })
            })
            .collect::<Result<_, _>>()?;
        if species.len() != counts.len() || species.is_empty() {
            return Err(PoscarError::Parse {
                line: 7,
                kind: PoscarParseErrorKind::SpeciesCountMismatch {
                    species: species.len(),
                    counts: counts.len(),
                },
            });
        }

        let mode = line(7, "coordinate mode")?.trim();
        if !mode.starts_with('D') && !mode.starts_with('d') {
            return Err(PoscarError::UnsupportedCoordinateMode {
                line: 8,
                found: mode.to_string(),
            });
        }

        let mut groups = Vec::with_capacity(species.len());
        let mut cursor = 8;
        for (label, count) in species.into_iter().zip(counts) {
            let mut sites = Vec::with_capacity(count);
            for _ in 0..count {
                let content = line(cursor, "atom coordinate line")?;
                sites.push(parse_vector(content, cursor + 1)?);
                cursor += 1;
            }
            groups.push(SpeciesGroup::new(label, sites));
        }

        Ok((
            Structure::new(lattice, scale, groups),
            PoscarMetadata { title },
        ))
    }

    fn write_to(
        structure: &Structure,
        metadata: &Self::Metadata,
        writer: &mut impl Write,
    ) -> Result<(), Self::Error> {
        writeln!(writer, "{}", metadata.title)?;
        // The lattice rows already carry physical units.
        writeln!(writer, "  1.000")?;
        for axis in 0..3 {
            let row = structure.lattice.row(axis);
            writeln!(
                writer,
                "  {:.16}  {:.16}  {:.16}",
                row[0], row[1], row[2]
            )?;
        }
        let labels: Vec<&str> = structure.species().collect();
        writeln!(writer, "{}", labels.join("  "))?;
        let counts: Vec<String> = structure.groups.iter().map(|g| g.len().to_string()).collect();
        writeln!(writer, "{}", counts.join("  "))?;
        writeln!(writer, "Direct")?;
        for group in &structure.groups {
            for (offset, site) in group.sites.iter().enumerate() {
                writeln!(
                    writer,
                    "  {:>18.16}  {:>18.16}  {:>18.16}   {}{}",
                    site[0],
                    site[1],
                    site[2],
                    group.species,
                    offset + 1
                )?;
            }
        }
        Ok(())
    }
}
