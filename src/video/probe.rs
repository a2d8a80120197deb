use std::io::{Read, Seek, SeekFrom};
use std::path::Path;
use crate::config::ProcessingConfig;
use crate::errors::FairwayError;
use tracing::debug;

/// Facts about a stored or candidate video file.
#[derive(Debug, Clone, PartialEq)]
pub struct VideoInfo {
    pub bytes: u64,
    /// From the container header, falling back to the caller's hint.
    pub duration_secs: Option<f64>,
}

struct BoxHeader {
    kind: [u8; 4],
    /// Offset of the payload.
    body: u64,
    /// Offset one past the end of the box.
    end: u64,
}

fn read_header<R: Read + Seek>(r: &mut R, at: u64, limit: u64) -> std::io::Result<Option<BoxHeader>> {
    if at.checked_add(8).map_or(true, |e| e > limit) {
        return Ok(None);
    }
    r.seek(SeekFrom::Start(at))?;
    let mut head = [0u8; 8];
    r.read_exact(&mut head)?;
    let size32 = u32::from_be_bytes([head[0], head[1], head[2], head[3]]) as u64;
    let kind = [head[4], head[5], head[6], head[7]];

    let (size, header_len) = match size32 {
        0 => (limit - at, 8),
        1 => {
            if at.checked_add(16).map_or(true, |e| e > limit) {
                return Ok(None);
            }
            let mut large = [0u8; 8];
            r.read_exact(&mut large)?;
            (u64::from_be_bytes(large), 16)
        }
        n => (n, 8),
    };
    // Malformed sizes end the walk; every box must move it forward
    let end = match at.checked_add(size) {
        Some(end) if size >= header_len && end <= limit && end > at => end,
        _ => return Ok(None),
    };
    Ok(Some(BoxHeader { kind, body: at + header_len, end }))
}

fn find_box<R: Read + Seek>(r: &mut R, kind: &[u8; 4], start: u64, limit: u64) -> std::io::Result<Option<BoxHeader>> {
    let mut at = start;
    while let Some(header) = read_header(r, at, limit)? {
        if &header.kind == kind {
            return Ok(Some(header));
        }
        at = header.end;
    }
    Ok(None)
}

fn read_u32<R: Read>(r: &mut R) -> std::io::Result<u32> {
    let mut b = [0u8; 4];
    r.read_exact(&mut b)?;
    Ok(u32::from_be_bytes(b))
}

fn read_u64<R: Read>(r: &mut R) -> std::io::Result<u64> {
    let mut b = [0u8; 8];
    r.read_exact(&mut b)?;
    Ok(u64::from_be_bytes(b))
}

/// Duration in seconds from an MP4/QuickTime `moov/mvhd` box, if present.
pub fn mvhd_duration<R: Read + Seek>(r: &mut R) -> std::io::Result<Option<f64>> {
    let len = r.seek(SeekFrom::End(0))?;
    let Some(moov) = find_box(r, b"moov", 0, len)? else {
        return Ok(None);
    };
    let Some(mvhd) = find_box(r, b"mvhd", moov.body, moov.end)? else {
        return Ok(None);
    };

    r.seek(SeekFrom::Start(mvhd.body))?;
    let version_flags = read_u32(r)?;
    let (timescale, duration) = if version_flags >> 24 == 1 {
        let _created = read_u64(r)?;
        let _modified = read_u64(r)?;
        (read_u32(r)?, read_u64(r)?)
    } else {
        let _created = read_u32(r)?;
        let _modified = read_u32(r)?;
        (read_u32(r)?, read_u32(r)? as u64)
    };

    // All-ones duration means unknown
    if timescale == 0 || duration == u64::MAX || duration == u32::MAX as u64 {
        return Ok(None);
    }
    Ok(Some(duration as f64 / timescale as f64))
}

pub fn extension_of(name: &str) -> Option<String> {
    let name = name.split(['?', '#']).next().unwrap_or(name);
    Path::new(name)
        .extension()
        .map(|e| e.to_string_lossy().to_ascii_lowercase())
}

pub fn check_extension(name: &str, config: &ProcessingConfig) -> Result<String, FairwayError> {
    let ext = extension_of(name)
        .ok_or_else(|| FairwayError::Validation(format!("Video '{}' has no file extension", name)))?;
    if !config.allowed_extensions.iter().any(|a| a.eq_ignore_ascii_case(&ext)) {
        return Err(FairwayError::Validation(format!(
            "Unsupported video type '.{}' (allowed: {})",
            ext,
            config.allowed_extensions.join(", ")
        )));
    }
    Ok(ext)
}

pub fn check_duration(duration: Option<f64>, config: &ProcessingConfig) -> Result<(), FairwayError> {
    match duration {
        Some(d) if !d.is_finite() || d < 0.0 => {
            Err(FairwayError::Validation(format!("Invalid duration {}", d)))
        }
        Some(d) if d < config.min_duration_secs => Err(FairwayError::Validation(format!(
            "Video is too short ({:.2}s, minimum {:.2}s)",
            d, config.min_duration_secs
        ))),
        Some(d) if d > config.max_duration_secs => Err(FairwayError::Validation(format!(
            "Video is too long ({:.2}s, maximum {:.2}s)",
            d, config.max_duration_secs
        ))),
        _ => Ok(()),
    }
}

/// Check a local video file: readable, non-empty, within size and duration limits.
pub fn probe_video(path: &Path, hint: Option<f64>, config: &ProcessingConfig) -> Result<VideoInfo, FairwayError> {
    check_extension(&path.to_string_lossy(), config)?;

    let mut file = std::fs::File::open(path)
        .map_err(|e| FairwayError::Validation(format!("Video {} is not readable: {}", path.display(), e)))?;
    let bytes = file.metadata()?.len();
    if bytes == 0 {
        return Err(FairwayError::Validation(format!("Video {} is empty", path.display())));
    }
    if bytes > config.max_video_bytes {
        return Err(FairwayError::Validation(format!(
            "Video is {} bytes, limit is {}",
            bytes, config.max_video_bytes
        )));
    }

    let probed = match mvhd_duration(&mut file) {
        Ok(d) => d,
        Err(e) => {
            debug!(path = %path.display(), error = %e, "Container header not parsable");
            None
        }
    };
    let duration_secs = probed.or(hint);
    check_duration(duration_secs, config)?;
    Ok(VideoInfo { bytes, duration_secs })
}

/// Minimal `ftyp` + `moov/mvhd` file, used by tests.
#[cfg(test)]
pub(crate) fn mp4_bytes(duration_secs: f64) -> Vec<u8> {
    let timescale: u32 = 600;
    let mut mvhd = Vec::new();
    mvhd.extend_from_slice(&0u32.to_be_bytes());
    mvhd.extend_from_slice(&0u32.to_be_bytes());
    mvhd.extend_from_slice(&0u32.to_be_bytes());
    mvhd.extend_from_slice(&timescale.to_be_bytes());
    mvhd.extend_from_slice(&((duration_secs * timescale as f64) as u32).to_be_bytes());
    mvhd.extend_from_slice(&[0u8; 80]);

    let mut out = Vec::new();
    out.extend_from_slice(&16u32.to_be_bytes());
    out.extend_from_slice(b"ftypisom");
    out.extend_from_slice(&[0, 0, 2, 0]);
    let mvhd_len = 8 + mvhd.len() as u32;
    out.extend_from_slice(&(8 + mvhd_len).to_be_bytes());
    out.extend_from_slice(b"moov");
    out.extend_from_slice(&mvhd_len.to_be_bytes());
    out.extend_from_slice(b"mvhd");
    out.extend_from_slice(&mvhd);
    out
}
