use crate::io::traits::StructureFile;
use crate::model::structure::{ModelError, SpeciesBlock, Structure};
use nalgebra::Vector3;
use std::io::{self, BufRead, Write};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PoscarError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("Parse error on line {line}: {kind}")]
    Parse {
        line: usize,
        kind: PoscarParseErrorKind,
    },
    #[error("File ended before {expected}")]
    UnexpectedEof { expected: String },
    #[error(transparent)]
    Model(#[from] ModelError),
}

#[derive(Debug, Error)]
pub enum PoscarParseErrorKind {
    #[error("Invalid float format (value: '{value}')")]
    InvalidFloat { value: String },
    #[error("Invalid integer format (value: '{value}')")]
    InvalidInt { value: String },
    #[error("Expected at least {expected} whitespace-separated fields, found {found}")]
    TooFewFields { expected: usize, found: usize },
    #[error("Element count line has {counts} entries for {symbols} element symbols")]
    SpeciesArityMismatch { symbols: usize, counts: usize },
}

/// Reader/writer for the fixed positional POSCAR layout.
///
/// Layout: comment, scale factor, three lattice vector rows, element symbol
/// row, element count row, coordinate-mode marker, then one position row per
/// atom. Position rows may carry trailing fields (selective-dynamics flags);
/// only the first three are used.
pub struct PoscarFile;

impl StructureFile for PoscarFile {
    type Error = PoscarError;

    fn read_from(reader: &mut impl BufRead) -> Result<Structure, Self::Error> {
        let lines: Vec<String> = reader
            .lines()
            .collect::<Result<Vec<_>, io::Error>>()?
            .into_iter()
            .map(|l| l.trim().to_string())
            .collect();

        let comment = required_line(&lines, 0, "comment line")?.to_string();
        let scale = parse_float(required_line(&lines, 1, "scale factor")?, 2)?;
        let lattice = [
            parse_vec3(required_line(&lines, 2, "lattice vector a")?, 3)?,
            parse_vec3(required_line(&lines, 3, "lattice vector b")?, 4)?,
            parse_vec3(required_line(&lines, 4, "lattice vector c")?, 5)?,
        ];

        let symbols: Vec<&str> = required_line(&lines, 5, "element symbols")?
            .split_whitespace()
            .collect();
        let counts_line = required_line(&lines, 6, "element counts")?;
        let counts = counts_line
            .split_whitespace()
            .map(|tok| {
                tok.parse::<usize>().map_err(|_| PoscarError::Parse {
                    line: 7,
                    kind: PoscarParseErrorKind::InvalidInt { value: tok.into() },
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        if counts.len() != symbols.len() {
            return Err(PoscarError::Parse {
                line: 7,
                kind: PoscarParseErrorKind::SpeciesArityMismatch {
                    symbols: symbols.len(),
                    counts: counts.len(),
                },
            });
        }
        let species: Vec<SpeciesBlock> = symbols
            .iter()
            .zip(&counts)
            .map(|(symbol, &count)| SpeciesBlock::new(*symbol, count))
            .collect();

        let coordinate_mode = required_line(&lines, 7, "coordinate-mode marker")?.to_string();

        let atom_total: usize = counts.iter().sum();
        let mut positions = Vec::with_capacity(atom_total);
        for i in 0..atom_total {
            let row = required_line(&lines, 8 + i, &format!("atomic position {}", i + 1))?;
            positions.push(parse_vec3(row, 9 + i)?);
        }

        Ok(Structure::new(
            comment,
            scale,
            lattice,
            species,
            coordinate_mode,
            positions,
        )?)
    }

    fn write_to(structure: &Structure, writer: &mut impl Write) -> Result<(), Self::Error> {
        writeln!(writer, "{}", structure.comment())?;
        writeln!(writer, " {:20.16}", structure.scale())?;
        for row in structure.lattice() {
            writeln!(writer, "   {:20.16} {:20.16} {:20.16}", row.x, row.y, row.z)?;
        }

        let symbols: Vec<&str> = structure.species().iter().map(|s| s.symbol.as_str()).collect();
        writeln!(writer, "   {}", symbols.join("  "))?;
        let counts: Vec<String> = structure
            .species()
            .iter()
            .map(|s| s.count.to_string())
            .collect();
        writeln!(writer, "   {}", counts.join("  "))?;

        writeln!(writer, "{}", structure.coordinate_mode())?;
        for pos in structure.positions() {
            writeln!(writer, "  {:20.16} {:20.16} {:20.16}", pos.x, pos.y, pos.z)?;
        }
        Ok(())
    }
}

fn required_line<'a>(lines: &'a [String], index: usize, expected: &str) -> Result<&'a str, PoscarError> {
    lines
        .get(index)
        .map(|s| s.as_str())
        .ok_or_else(|| PoscarError::UnexpectedEof {
            expected: expected.to_string(),
        })
}

fn parse_float(value: &str, line: usize) -> Result<f64, PoscarError> {
    value.parse().map_err(|_| PoscarError::Parse {
        line,
        kind: PoscarParseErrorKind::InvalidFloat {
            value: value.into(),
        },
    })
}

fn parse_vec3(row: &str, line: usize) -> Result<Vector3<f64>, PoscarError> {
    let fields: Vec<&str> = row.split_whitespace().collect();
    if fields.len() < 3 {
        return Err(PoscarError::Parse {
            line,
            kind: PoscarParseErrorKind::TooFewFields {
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
