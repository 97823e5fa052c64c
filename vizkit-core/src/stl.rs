//! STL reader for binary and ASCII formats
use std::path::Path;

use nalgebra::Point3;
use nom::{
    bytes::complete::{tag, take},
    character::complete::{multispace0, multispace1, not_line_ending},
    combinator::opt,
    multi::{count, many0},
    number::complete::{float, le_f32, le_u32},
    sequence::{preceded, tuple},
    IResult,
};
use tracing::{debug, info};

use crate::error::{VizError, VizResult};
use crate::geometry::{PolyData, Triangle};

/// STL binary header size in bytes
const HEADER_SIZE: usize = 80;

/// Size of one binary facet: normal, three vertices, attribute count
const FACET_SIZE: usize = 50;

/// Read an STL file from disk, merging coincident vertices
pub fn load_stl<P: AsRef<Path>>(path: P) -> VizResult<PolyData> {
    let path = path.as_ref();
    let data = std::fs::read(path).map_err(|e| VizError::from_io(e, path))?;
    let poly = parse_stl(&data)?;
    info!(
        path = %path.display(),
        points = poly.number_of_points(),
        triangles = poly.triangles.len(),
        "Loaded STL"
    );
    Ok(poly)
}

/// Detect and parse STL data (binary or ASCII)
pub fn parse_stl(data: &[u8]) -> VizResult<PolyData> {
    let triangles = parse_stl_triangles(data)?;
    Ok(PolyData::from_triangles(&triangles))
}

fn parse_stl_triangles(data: &[u8]) -> VizResult<Vec<Triangle>> {
    // Binary files may also start with "solid", so ASCII is only a first guess
    let start = data
        .iter()
        .position(|b| !b.is_ascii_whitespace())
        .unwrap_or(data.len());
    let trimmed = &data[start..];
    if trimmed.starts_with(b"solid") {
        if let Ok(text) = std::str::from_utf8(trimmed) {
            match parse_ascii_stl(text) {
                Ok(triangles) => return Ok(triangles),
                Err(e) => debug!(error = %e, "ASCII parse failed, trying binary"),
            }
        }
    }

    parse_binary_stl(data)
}

/// Parse a binary STL file
pub fn parse_binary_stl(data: &[u8]) -> VizResult<Vec<Triangle>> {
    if data.len() < HEADER_SIZE + 4 {
        return Err(VizError::unsupported("file too small to be a valid STL"));
    }

    let (rest, triangle_count) = binary_header(data)
        .map_err(|_| VizError::unsupported("invalid STL header"))?;
    let triangle_count = triangle_count as usize;

    if rest.len() < triangle_count * FACET_SIZE {
        return Err(VizError::unsupported(format!(
            "unexpected end of file: {} facets declared, {} bytes of facet data",
            triangle_count,
            rest.len()
        )));
    }

    let (_, triangles) = count(binary_facet, triangle_count)(rest)
        .map_err(|_| VizError::unsupported("truncated STL facet"))?;

    Ok(triangles)
}

fn binary_header(input: &[u8]) -> IResult<&[u8], u32> {
    preceded(take(HEADER_SIZE), le_u32)(input)
}

fn binary_facet(input: &[u8]) -> IResult<&[u8], Triangle> {
    // Stored normals are often wrong; they are recomputed downstream
    let (input, _normal) = binary_vector3(input)?;
    let (input, v0) = binary_vector3(input)?;
    let (input, v1) = binary_vector3(input)?;
    let (input, v2) = binary_vector3(input)?;
    let (input, _attribute) = take(2usize)(input)?;
    Ok((input, Triangle::new(v0, v1, v2)))
}

fn binary_vector3(input: &[u8]) -> IResult<&[u8], Point3<f32>> {
    let (input, (x, y, z)) = tuple((le_f32, le_f32, le_f32))(input)?;
    Ok((input, Point3::new(x, y, z)))
}

/// Parse an ASCII STL file
pub fn parse_ascii_stl(input: &str) -> VizResult<Vec<Triangle>> {
    match parse_ascii_stl_impl(input) {
        Ok((_, triangles)) => Ok(triangles),
        Err(e) => Err(VizError::unsupported(format!(
            "failed to parse ASCII STL: {:?}",
            e.map(|inner| inner.code)
        ))),
    }
}

fn parse_ascii_stl_impl(input: &str) -> IResult<&str, Vec<Triangle>> {
    let (input, _) = preceded(multispace0, tag("solid"))(input)?;
    let (input, _name) = not_line_ending(input)?;
    let (input, triangles) = many0(parse_facet)(input)?;
    let (input, _) = preceded(multispace0, tag("endsolid"))(input)?;
    let (input, _) = opt(not_line_ending)(input)?;

    Ok((input, triangles))
}

fn parse_facet(input: &str) -> IResult<&str, Triangle> {
    let (input, _) = preceded(multispace0, tag("facet"))(input)?;
    let (input, _) = preceded(multispace1, tag("normal"))(input)?;
    let (input, _normal) = parse_vector3(input)?;
    let (input, _) = preceded(multispace0, tag("outer"))(input)?;
    let (input, _) = preceded(multispace1, tag("loop"))(input)?;
    let (input, v1) = parse_vertex(input)?;
    let (input, v2) = parse_vertex(input)?;
    let (input, v3) = parse_vertex(input)?;
    let (input, _) = preceded(multispace0, tag("endloop"))(input)?;
    let (input, _) = preceded(multispace0, tag("endfacet"))(input)?;

    Ok((input, Triangle::new(v1, v2, v3)))
}

fn parse_vertex(input: &str) -> IResult<&str, Point3<f32>> {
    let (input, _) = preceded(multispace0, tag("vertex"))(input)?;
    let (input, (x, y, z)) = parse_vector3(input)?;
    Ok((input, Point3::new(x, y, z)))
}

fn parse_vector3(input: &str) -> IResult<&str, (f32, f32, f32)> {
    let (input, _) = multispace0(input)?;
    let (input, x) = float(input)?;
    let (input, _) = multispace1(input)?;
    let (input, y) = float(input)?;
    let (input, _) = multispace1(input)?;
    let (input, z) = float(input)?;
    Ok((input, (x, y, z)))
}

/// Encode triangles as binary STL. Used for fixtures and round trips.
pub fn write_binary_stl(triangles: &[Triangle]) -> Vec<u8> {
    let mut out = Vec::with_capacity(HEADER_SIZE + 4 + triangles.len() * FACET_SIZE);
    out.extend_from_slice(&[0u8; HEADER_SIZE]);
    out.extend_from_slice(&(triangles.len() as u32).to_le_bytes());
    for triangle in triangles {
        let normal = triangle.calculate_normal();
        for c in normal.iter() {
            out.extend_from_slice(&c.to_le_bytes());
        }
        for v in &triangle.vertices {
            for c in v.coords.iter() {
                out.extend_from_slice(&c.to_le_bytes());
            }
        }
        out.extend_from_slice(&0u16.to_le_bytes());
    }
    out
}
