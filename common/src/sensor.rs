use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SensorError {
    #[error("no temperature probe found")]
    NotFound,
    #[error("probe reported a CRC mismatch")]
    CrcMismatch,
    #[error("unparseable probe output: {0}")]
    Malformed(String),
    #[error("probe io error: {0}")]
    Io(String),
}

/// Parses the two-line `w1_slave` report of a DS18B20:
///
/// ```text
/// 72 01 4b 46 7f ff 0e 10 57 : crc=57 YES
/// 72 01 4b 46 7f ff 0e 10 57 t=23125
/// ```
pub fn parse_w1_slave(report: &str) -> Result<f32, SensorError> {
    let mut lines = report.lines();
    let status = lines
        .next()
        .ok_or_else(|| SensorError::Malformed("empty report".to_string()))?;
    if !status.trim_end().ends_with("YES") {
        return Err(SensorError::CrcMismatch);
    }

    let data = lines
        .next()
        .ok_or_else(|| SensorError::Malformed("missing data line".to_string()))?;
    let Some((_, raw)) = data.split_once("t=") else {
        return Err(SensorError::Malformed(data.trim().to_string()));
    };
    let millidegrees = raw
        .trim()
        .parse::<i32>()
        .map_err(|_| SensorError::Malformed(raw.trim().to_string()))?;

    Ok(millidegrees as f32 / 1000.0)
}
