//! Text side channel: one `x y z` triple per voxel, in buffer order.
//!
//! The values are the stored per-voxel offset sums (`x_mm y_mm z_mm`), not
//! vehicle coordinates.

use std::io::{BufRead, BufWriter, Write};
use std::path::Path;

use super::error::DumpError;
use crate::voxel::VoxelBuffer;

/// Write the points of `buffer` to `writer`.
pub fn write_points<W: Write>(buffer: &VoxelBuffer, writer: W) -> Result<(), DumpError> {
    let mut writer = BufWriter::new(writer);
    for p in buffer.points() {
        writeln!(writer, "{} {} {}", p.x_mm, p.y_mm, p.z_mm)?;
    }
    writer.flush()?;
    Ok(())
}

/// Read points written by [`write_points`].
///
/// Blank lines are skipped.
pub fn read_points<R: BufRead>(reader: R) -> Result<Vec<[i16; 3]>, DumpError> {
    let mut points = Vec::new();
    for (i, line) in reader.lines().enumerate() {
        let line = line?;
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        let invalid = || DumpError::InvalidPointLine {
            line: i + 1,
            content: line.clone(),
        };
        let mut fields = trimmed.split_whitespace().map(str::parse::<i16>);
        let mut next = || fields.next().and_then(Result::ok).ok_or_else(invalid);
        let point = [next()?, next()?, next()?];
        if fields.next().is_some() {
            return Err(invalid());
        }
        points.push(point);
    }
    Ok(points)
}

/// Write the points of `buffer` to a file.
pub fn save_points(path: &Path, buffer: &VoxelBuffer) -> Result<(), DumpError> {
    let file = std::fs::File::create(path)?;
    write_points(buffer, file)
}

/// Read a points file.
pub fn load_points(path: &Path) -> Result<Vec<[i16; 3]>, DumpError> {
    let file = std::fs::File::open(path)?;
    read_points(std::io::BufReader::new(file))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{VoxelCoord, VoxelPoint};
    use crate::grid::VoxelSample;
    use crate::voxel::VoxelScratch;

    fn sample(x: i32, offsets: (i16, i16, i16)) -> VoxelSample {
        VoxelSample {
            coord: VoxelCoord::new(x, 2, 3),
            point: VoxelPoint {
                x_mm: offsets.0,
                y_mm: offsets.1,
                z_mm: offsets.2,
                uncertainty_cm: 1,
                existence: 1,
            },
        }
    }

    fn buffer() -> VoxelBuffer {
        let mut scratch = VoxelScratch::new();
        scratch.add_sample(&sample(1, (-12, 0, 0)));
        scratch.add_sample(&sample(4, (0, 0, 300)));
        let mut buffer = VoxelBuffer::with_capacity(10);
        assert!(buffer.merge_scratch(&scratch).is_merged());
        buffer
    }

    #[test]
    fn test_write_format() {
        let mut out = Vec::new();
        write_points(&buffer(), &mut out).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "-12 0 0\n0 0 300\n");
    }

    #[test]
    fn test_read_back() {
        let mut out = Vec::new();
        write_points(&buffer(), &mut out).unwrap();
        let points = read_points(out.as_slice()).unwrap();
        assert_eq!(points, vec![[-12, 0, 0], [0, 0, 300]]);
    }

    #[test]
    fn test_read_rejects_bad_lines() {
        let err = read_points("1 2 3\n\n4 five 6\n".as_bytes()).unwrap_err();
        assert!(matches!(err, DumpError::InvalidPointLine { line: 3, .. }));

        let err = read_points("1 2\n".as_bytes()).unwrap_err();
        assert!(matches!(err, DumpError::InvalidPointLine { line: 1, .. }));

        let err = read_points("1 2 3 4\n".as_bytes()).unwrap_err();
        assert!(matches!(err, DumpError::InvalidPointLine { line: 1, .. }));
    }

    #[test]
    fn test_file_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("points.txt");
        save_points(&path, &buffer()).unwrap();
        assert_eq!(load_points(&path).unwrap().len(), 2);
    }
}
