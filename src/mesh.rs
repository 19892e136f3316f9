//! Loading triangle meshes from disk.
//!
//! The `.tri` format is plain text: whitespace separated numbers, nine per triangle
//! (`ax ay az bx by bz cx cy cz`). Line breaks carry no meaning. Reading stops at the first
//! token that is not a number, keeping every complete triangle before it.
//!
//! `.stl` files, ASCII or binary, are read with `stl_io`. Facet normals are ignored.

use std::fs::{self, File};
use std::io::{self, BufReader, Read, Seek};
use std::path::{Path, PathBuf};

use log::{debug, warn};
use thiserror::Error;

use crate::triangle::Triangle;
use crate::{Point3, Real};

/// Errors raised while loading a mesh.
#[derive(Debug, Error)]
pub enum MeshError {
    /// The file could not be read.
    #[error("failed to read {}", path.display())]
    Io {
        /// The file that was being read.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },

    /// The file extension does not name a supported format.
    #[error("unsupported mesh format {}, expected a .tri or .stl file", .0.display())]
    UnsupportedFormat(PathBuf),

    /// The STL data could not be decoded.
    #[error("malformed STL data")]
    Stl(#[source] io::Error),

    /// The input is not empty, but its first triangle record is broken.
    #[error("line {line}: expected a number, found {token:?}")]
    Malformed {
        /// One-based line number of the offending token.
        line: usize,
        /// The token that failed to parse.
        token: String,
    },
}

/// Result type of the mesh loaders.
pub type Result<T> = std::result::Result<T, MeshError>;

fn triangle_from_record(record: &[Real; 9]) -> Triangle {
    Triangle::new(
        Point3::new(record[0], record[1], record[2]),
        Point3::new(record[3], record[4], record[5]),
        Point3::new(record[6], record[7], record[8]),
    )
}

/// Parses `.tri` text, multiplying every coordinate by `scale`.
///
/// # Examples
/// ```
/// use tribvh::mesh::parse_tri;
///
/// let triangles = parse_tri("0 0 0  1 0 0  0 1 0\n0 0 1 1 0 1 0 1 1", 2.0).unwrap();
/// assert_eq!(triangles.len(), 2);
/// assert_eq!(triangles[1].c.z, 2.0);
/// ```
pub fn parse_tri(input: &str, scale: Real) -> Result<Vec<Triangle>> {
    let mut triangles = Vec::new();
    let mut record = [0.0; 9];
    let mut filled = 0;

    for (line_index, line) in input.lines().enumerate() {
        for token in line.split_whitespace() {
            let Ok(value) = token.parse::<Real>() else {
                if triangles.is_empty() {
                    return Err(MeshError::Malformed {
                        line: line_index + 1,
                        token: token.to_string(),
                    });
                }
                warn!(
                    "Stopped reading at line {}: {:?} is not a number, kept {} triangles",
                    line_index + 1,
                    token,
                    triangles.len()
                );
                return Ok(triangles);
            };

            record[filled] = value * scale;
            filled += 1;
            if filled == record.len() {
                triangles.push(triangle_from_record(&record));
                filled = 0;
            }
        }
    }

    if filled != 0 {
        warn!("Ignoring {} values of an incomplete trailing triangle", filled);
    }
    Ok(triangles)
}

/// Reads and parses a `.tri` file.
pub fn load_tri(path: impl AsRef<Path>, scale: Real) -> Result<Vec<Triangle>> {
    let path = path.as_ref();
    let input = fs::read_to_string(path).map_err(|source| MeshError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let triangles = parse_tri(&input, scale)?;
    debug!("Loaded {} triangles from {}", triangles.len(), path.display());
    Ok(triangles)
}

/// Decodes ASCII or binary STL data, multiplying every coordinate by `scale`.
pub fn parse_stl<R: Read + Seek>(reader: &mut R, scale: Real) -> Result<Vec<Triangle>> {
    let facets = stl_io::create_stl_reader(reader).map_err(MeshError::Stl)?;
    let to_point = |v: &stl_io::Vertex| Point3::new(v[0] * scale, v[1] * scale, v[2] * scale);

    facets
        .map(|facet| {
            let facet = facet.map_err(MeshError::Stl)?;
            let [a, b, c] = &facet.vertices;
            Ok(Triangle::new(to_point(a), to_point(b), to_point(c)))
        })
        .collect()
}

/// Reads and decodes an STL file.
pub fn load_stl(path: impl AsRef<Path>, scale: Real) -> Result<Vec<Triangle>> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|source| MeshError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let triangles = parse_stl(&mut BufReader::new(file), scale)?;
    debug!("Loaded {} triangles from {}", triangles.len(), path.display());
    Ok(triangles)
}

/// Loads a mesh, choosing the parser from the file extension.
pub fn load_mesh(path: impl AsRef<Path>, scale: Real) -> Result<Vec<Triangle>> {
    let path = path.as_ref();
    match path.extension().and_then(|ext| ext.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("tri") => load_tri(path, scale),
        Some(ext) if ext.eq_ignore_ascii_case("stl") => load_stl(path, scale),
        _ => Err(MeshError::UnsupportedFormat(path.to_path_buf())),
    }
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::io::Cursor;

    use crate::mesh::{load_mesh, load_tri, parse_stl, parse_tri, MeshError};
    use crate::Point3;

    /// Encodes `facets` as binary STL, with zero normals.
    fn binary_stl(facets: &[[[f32; 3]; 3]]) -> Vec<u8> {
        let mut bytes = vec![0; 80];
        bytes.extend_from_slice(&(facets.len() as u32).to_le_bytes());
        for facet in facets {
            for _ in 0..3 {
                bytes.extend_from_slice(&0.0_f32.to_le_bytes());
            }
            for coordinate in facet.iter().flatten() {
                bytes.extend_from_slice(&coordinate.to_le_bytes());
            }
            bytes.extend_from_slice(&0_u16.to_le_bytes());
        }
        bytes
    }

    #[test]
    fn test_parse_records_across_lines() {
        let input = "0 0 0\n1 0 0\n0 1 0\n\n2 2 2 3 2 2 2 3 2\n";
        let triangles = parse_tri(input, 1.0).unwrap();
        assert_eq!(triangles.len(), 2);
        assert_eq!(triangles[0].b, Point3::new(1.0, 0.0, 0.0));
        assert_eq!(triangles[1].a, Point3::new(2.0, 2.0, 2.0));
    }

    #[test]
    fn test_parse_scales_coordinates() {
        let triangles = parse_tri("2 0 0 0 2 0 0 0 2", 0.5).unwrap();
        assert_eq!(triangles[0].a, Point3::new(1.0, 0.0, 0.0));
        assert_eq!(triangles[0].c, Point3::new(0.0, 0.0, 1.0));
    }

    #[test]
    fn test_parse_stops_at_garbage() {
        let input = "0 0 0 1 0 0 0 1 0\n1 1 1 x 2 2 2 3 3\n4 4 4 5 5 5 6 6 6\n";
        let triangles = parse_tri(input, 1.0).unwrap();
        assert_eq!(triangles.len(), 1);
    }

    #[test]
    fn test_parse_ignores_incomplete_tail() {
        let triangles = parse_tri("0 0 0 1 0 0 0 1 0 5 5", 1.0).unwrap();
        assert_eq!(triangles.len(), 1);
    }

    #[test]
    fn test_parse_empty() {
        assert!(parse_tri("", 1.0).unwrap().is_empty());
        assert!(parse_tri("  \n\n", 1.0).unwrap().is_empty());
    }

    #[test]
    fn test_parse_malformed_first_record() {
        match parse_tri("0 0 0\nsolid cube\n", 1.0) {
            Err(MeshError::Malformed { line, token }) => {
                assert_eq!(line, 2);
                assert_eq!(token, "solid");
            }
            other => panic!("unexpected result {:?}", other),
        }
    }

    #[test]
    fn test_parse_binary_stl() {
        let bytes = binary_stl(&[
            [[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]],
            [[0.0, 0.0, 2.0], [1.0, 0.0, 2.0], [0.0, 1.0, 2.0]],
        ]);
        let triangles = parse_stl(&mut Cursor::new(bytes), 2.0).unwrap();
        assert_eq!(triangles.len(), 2);
        assert_eq!(triangles[0].b, Point3::new(2.0, 0.0, 0.0));
        assert_eq!(triangles[1].c, Point3::new(0.0, 2.0, 4.0));
    }

    #[test]
    fn test_truncated_stl() {
        let mut bytes = binary_stl(&[[[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]]]);
        bytes.truncate(bytes.len() - 20);
        let err = parse_stl(&mut Cursor::new(bytes), 1.0).unwrap_err();
        assert!(matches!(err, MeshError::Stl(_)));
    }

    #[test]
    fn test_load_stl_from_disk() {
        let path = std::env::temp_dir().join(format!("tribvh-mesh-{}.stl", std::process::id()));
        fs::write(&path, binary_stl(&[[[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]]])).unwrap();
        let triangles = load_mesh(&path, 1.0);
        fs::remove_file(&path).unwrap();

        assert_eq!(triangles.unwrap().len(), 1);
    }

    #[test]
    fn test_unsupported_extension() {
        let err = load_mesh("model.obj", 1.0).unwrap_err();
        assert!(matches!(err, MeshError::UnsupportedFormat(_)));
        assert!(err.to_string().contains("model.obj"));

        let err = load_mesh("model", 1.0).unwrap_err();
        assert!(matches!(err, MeshError::UnsupportedFormat(_)));
    }

    #[test]
    fn test_missing_file() {
        let err = load_tri("/nonexistent/tribvh/mesh.tri", 1.0).unwrap_err();
        assert!(matches!(err, MeshError::Io { .. }));
    }

    #[test]
    fn test_load_from_disk() {
        let path = std::env::temp_dir().join(format!("tribvh-mesh-{}.TRI", std::process::id()));
        fs::write(&path, "0 0 0 1 0 0 0 1 0\n0 0 1 1 0 1 0 1 1\n").unwrap();
        let triangles = load_mesh(&path, 1.0);
        fs::remove_file(&path).unwrap();

        let triangles = triangles.unwrap();
        assert_eq!(triangles.len(), 2);
        assert_eq!(triangles[1].c, Point3::new(0.0, 1.0, 1.0));
    }
}
