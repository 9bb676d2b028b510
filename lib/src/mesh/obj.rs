//! Wavefront OBJ mesh source.
//!
//! Only the records the slicer needs are read:
//! - `v x y z [w]` - a vertex (the optional `w` is ignored)
//! - `f i j k ...` - a face with 1-based vertex indices; `i/t/n` forms use
//!   the vertex part, negative indices count back from the last vertex
//!
//! Every other record (normals, texture coordinates, groups, comments) is
//! skipped.

use super::{Face, Mesh};
use crate::geometry::Point3;
use crate::{CoordF, Error, Result};
use log::debug;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// Load an OBJ file from disk.
pub fn load_obj<P: AsRef<Path>>(path: P) -> Result<Mesh> {
    let file = File::open(path.as_ref())?;
    parse_obj(BufReader::new(file))
}

/// Parse OBJ text into a [`Mesh`].
///
/// # Errors
///
/// [`Error::MalformedMeshInput`] for a vertex line without three numeric
/// coordinates, a face line with fewer than three indices, a zero or
/// unparsable index, or an index past the end of the vertex list.
pub fn parse_obj<R: BufRead>(reader: R) -> Result<Mesh> {
    let mut vertices: Vec<Point3> = Vec::new();
    let mut faces: Vec<(usize, Vec<i64>)> = Vec::new();

    for (line_index, line) in reader.lines().enumerate() {
        let line = line?;
        let line_no = line_index + 1;
        let mut tokens = line.split_whitespace();

        match tokens.next() {
            Some("v") => vertices.push(parse_vertex(tokens, line_no)?),
            Some("f") => {
                let raw = parse_face(tokens, line_no)?;
                faces.push((line_no, raw));
            }
            _ => {}
        }
    }

    let faces = faces
        .into_iter()
        .map(|(line_no, raw)| resolve_face(&raw, vertices.len(), line_no))
        .collect::<Result<Vec<Face>>>()?;

    debug!(
        "Parsed OBJ mesh: {} vertices, {} faces",
        vertices.len(),
        faces.len()
    );

    Mesh::new(vertices, faces)
}

fn parse_vertex<'a, I>(tokens: I, line_no: usize) -> Result<Point3>
where
    I: Iterator<Item = &'a str>,
{
    let coords = tokens
        .take(3)
        .map(|t| {
            t.parse::<CoordF>().map_err(|_| {
                Error::MalformedMeshInput(format!("line {}: bad vertex coordinate '{}'", line_no, t))
            })
        })
        .collect::<Result<Vec<CoordF>>>()?;

    if coords.len() < 3 {
        return Err(Error::MalformedMeshInput(format!(
            "line {}: vertex needs 3 coordinates, found {}",
            line_no,
            coords.len()
        )));
    }

    if let Some(bad) = coords.iter().find(|c| !c.is_finite()) {
        return Err(Error::MalformedMeshInput(format!(
            "line {}: vertex coordinate {} is not finite",
            line_no, bad
        )));
    }

    Ok(Point3::new(coords[0], coords[1], coords[2]))
}

fn parse_face<'a, I>(tokens: I, line_no: usize) -> Result<Vec<i64>>
where
    I: Iterator<Item = &'a str>,
{
    let indices = tokens
        .map(|t| {
            let vertex_part = t.split('/').next().unwrap_or(t);
            vertex_part.parse::<i64>().map_err(|_| {
                Error::MalformedMeshInput(format!("line {}: bad face index '{}'", line_no, t))
            })
        })
        .collect::<Result<Vec<i64>>>()?;

    if indices.len() < 3 {
        return Err(Error::MalformedMeshInput(format!(
            "line {}: face needs at least 3 vertices, found {}",
            line_no,
            indices.len()
        )));
    }

    Ok(indices)
}

/// Turn 1-based (or negative, relative) OBJ indices into 0-based ones.
fn resolve_face(raw: &[i64], vertex_count: usize, line_no: usize) -> Result<Face> {
    let count = vertex_count as i64;
    raw.iter()
        .map(|&i| {
            let resolved = match i {
                0 => None,
                i if i > 0 => Some(i - 1),
                i => Some(count + i),
            };
            match resolved {
                Some(r) if r >= 0 && r < count => Ok(r as usize),
                _ => Err(Error::MalformedMeshInput(format!(
                    "line {}: face index {} out of range (mesh has {} vertices)",
                    line_no, i, vertex_count
                ))),
            }
        })
        .collect::<Result<Vec<usize>>>()
        .map(Face::new)
}
