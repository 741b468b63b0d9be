/// STL file parser for binary and ASCII formats
///
/// Both formats come out as a triangle soup; `load_mesh` turns that into an
/// indexed `Mesh`. Normals stored in the file are read but not trusted, the
/// mesh recomputes them from the vertex winding.
use nom::{
    bytes::complete::{tag, take},
    character::complete::{multispace0, not_line_ending},
    combinator::{all_consuming, map},
    multi::{count, many0},
    number::complete::{double, le_f32, le_u16, le_u32},
    sequence::{preceded, tuple},
    IResult,
};

use crate::error::{RasterError, Result};
use crate::geometry::{Mesh, Triangle};
use crate::vector::Vec3;

const HEADER_LEN: usize = 80;
const FACET_LEN: usize = 50;

/// Parse a binary STL file
pub fn parse_binary_stl(data: &[u8]) -> Result<Vec<Triangle>> {
    if data.len() < HEADER_LEN + 4 {
        return Err(RasterError::Stl("file too small to be a valid STL".to_string()));
    }

    let declared = u32::from_le_bytes([data[80], data[81], data[82], data[83]]) as usize;
    let available = (data.len() - HEADER_LEN - 4) / FACET_LEN;
    if declared > available {
        return Err(RasterError::Stl(format!(
            "header declares {} triangles but the file only holds {}",
            declared, available
        )));
    }

    binary_solid(data)
        .map(|(_, triangles)| triangles)
        .map_err(|e| RasterError::Stl(format!("{:?}", e)))
}

fn binary_solid(input: &[u8]) -> IResult<&[u8], Vec<Triangle>> {
    let (input, _header) = take(HEADER_LEN)(input)?;
    let (input, triangle_count) = le_u32(input)?;
    count(binary_facet, triangle_count as usize)(input)
}

fn binary_facet(input: &[u8]) -> IResult<&[u8], Triangle> {
    let (input, _normal) = binary_vector(input)?;
    let (input, (v0, v1, v2)) = tuple((binary_vector, binary_vector, binary_vector))(input)?;
    let (input, _attribute_bytes) = le_u16(input)?;
    Ok((input, Triangle::new(v0, v1, v2)))
}

fn binary_vector(input: &[u8]) -> IResult<&[u8], Vec3> {
    map(tuple((le_f32, le_f32, le_f32)), |(x, y, z)| {
        Vec3::new(x as f64, y as f64, z as f64)
    })(input)
}

/// Parse an ASCII STL file
pub fn parse_ascii_stl(input: &str) -> Result<Vec<Triangle>> {
    all_consuming(ascii_solid)(input)
        .map(|(_, triangles)| triangles)
        .map_err(|e| RasterError::Stl(format!("malformed ASCII STL: {:?}", e)))
}

fn keyword<'a>(word: &'static str) -> impl FnMut(&'a str) -> IResult<&'a str, &'a str> {
    preceded(multispace0, tag(word))
}

fn ascii_solid(input: &str) -> IResult<&str, Vec<Triangle>> {
    let (input, _) = keyword("solid")(input)?;
    let (input, _name) = not_line_ending(input)?;
    let (input, triangles) = many0(ascii_facet)(input)?;
    let (input, _) = keyword("endsolid")(input)?;
    let (input, _name) = not_line_ending(input)?;
    let (input, _) = multispace0(input)?;
    Ok((input, triangles))
}

fn ascii_facet(input: &str) -> IResult<&str, Triangle> {
    let (input, _) = keyword("facet")(input)?;
    let (input, _) = keyword("normal")(input)?;
    let (input, _normal) = ascii_vector(input)?;
    let (input, _) = keyword("outer")(input)?;
    let (input, _) = keyword("loop")(input)?;
    let (input, v0) = preceded(keyword("vertex"), ascii_vector)(input)?;
    let (input, v1) = preceded(keyword("vertex"), ascii_vector)(input)?;
    let (input, v2) = preceded(keyword("vertex"), ascii_vector)(input)?;
    let (input, _) = keyword("endloop")(input)?;
    let (input, _) = keyword("endfacet")(input)?;
    Ok((input, Triangle::new(v0, v1, v2)))
}

fn ascii_vector(input: &str) -> IResult<&str, Vec3> {
    map(
        tuple((
            preceded(multispace0, double),
            preceded(multispace0, double),
            preceded(multispace0, double),
        )),
        |(x, y, z)| Vec3::new(x, y, z),
    )(input)
}

/// Detect and parse STL file (binary or ASCII)
pub fn parse_stl(data: &[u8]) -> Result<Vec<Triangle>> {
    // Some binary exporters also start their header with "solid"
    if data.starts_with(b"solid") {
        if let Ok(text) = std::str::from_utf8(data) {
            if let Ok(triangles) = parse_ascii_stl(text) {
                return Ok(triangles);
            }
        }
    }

    parse_binary_stl(data)
}

/// Parse an STL file into an indexed mesh with the default material.
pub fn load_mesh(data: &[u8]) -> Result<Mesh> {
    Ok(Mesh::from_triangles(&parse_stl(data)?))
}
