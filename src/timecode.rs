use thiserror::Error;

/// Error returned when a timecode string cannot be decoded
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TimecodeError {
    #[error("expected H:MM:SS time, got '{0}'")]
    BadShape(String),
    #[error("non-numeric field in timecode '{0}'")]
    BadField(String),
}

/// Format a presentation timestamp (seconds) as `H:MM:SS.ff`.
///
/// The fractional field is the centisecond truncation of the timestamp,
/// zero-padded to 2 digits. Hours carry no padding beyond a single digit.
pub fn encode(pts: f64) -> String {
    let whole = pts.floor();
    let centis = ((pts - whole) * 100.0) as u32;
    let total = whole as u64;

    let s = total % 60;
    let m = (total / 60) % 60;
    let h = total / 3600;

    format!("{}:{:02}:{:02}.{:02}", h, m, s, centis)
}

/// Parse a `H:MM:SS.ff` timecode back into seconds.
///
/// The fraction's place value scales with its digit count: `.5` is five
/// tenths, `.50` fifty hundredths, `.500` five hundred thousandths — all
/// 0.5 s. The whole-time part must have exactly three `:`-separated fields.
/// Decoding an encoded value recovers it only to centisecond precision.
pub fn decode(text: &str) -> Result<f64, TimecodeError> {
    let (whole, fraction) = match text.split_once('.') {
        Some((whole, fraction)) => (whole, Some(fraction)),
        None => (text, None),
    };

    let fields: Vec<&str> = whole.split(':').collect();
    if fields.len() != 3 {
        return Err(TimecodeError::BadShape(text.to_string()));
    }

    let mut parts = [0u64; 3];
    for (slot, field) in parts.iter_mut().zip(&fields) {
        *slot = field
            .parse()
            .map_err(|_| TimecodeError::BadField(text.to_string()))?;
    }
    let [h, m, s] = parts;

    let frac = match fraction {
        Some(digits) => {
            let value: u64 = digits
                .parse()
                .map_err(|_| TimecodeError::BadField(text.to_string()))?;
            value as f64 / 10_f64.powi(digits.len() as i32)
        }
        None => 0.0,
    };

    Ok((h * 3600 + m * 60 + s) as f64 + frac)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_formatting() {
        assert_eq!(encode(0.0), "0:00:00.00");
        assert_eq!(encode(3661.0), "1:01:01.00");
        assert_eq!(encode(125.5), "0:02:05.50");
        assert_eq!(encode(0.29), "0:00:00.28"); // truncation on an inexact float
        assert_eq!(encode(36000.25), "10:00:00.25");
    }

    #[test]
    fn test_decode_basic() {
        assert_eq!(decode("0:00:00.00").unwrap(), 0.0);
        assert_eq!(decode("1:01:01.00").unwrap(), 3661.0);
        assert_eq!(decode("0:02:05.50").unwrap(), 125.5);
        assert_eq!(decode("0:00:10").unwrap(), 10.0);
    }

    #[test]
    fn test_decode_fraction_width() {
        // Denominator scales with digit count, so these are all equal
        assert!((decode("0:00:01.5").unwrap() - 1.5).abs() < 1e-9);
        assert!((decode("0:00:01.50").unwrap() - 1.5).abs() < 1e-9);
        assert!((decode("0:00:01.500").unwrap() - 1.5).abs() < 1e-9);
    }

    #[test]
    fn test_round_trip_bound() {
        // Encode truncates to centiseconds, so the round trip may lose
        // up to 0.01 s but never more.
        for &pts in &[0.0, 0.009, 1.5, 59.999, 61.25, 3599.99, 3600.0, 86399.456] {
            let back = decode(&encode(pts)).unwrap();
            assert!(
                (back - pts).abs() < 0.01,
                "round trip of {} drifted to {}",
                pts,
                back
            );
        }
    }

    #[test]
    fn test_decode_rejects_bad_shapes() {
        assert!(matches!(decode("00:01.5"), Err(TimecodeError::BadShape(_))));
        assert!(matches!(
            decode("1:2:3:4.0"),
            Err(TimecodeError::BadShape(_))
        ));
        assert!(matches!(decode("abc"), Err(TimecodeError::BadShape(_))));
        assert!(matches!(
            decode("0:aa:01.5"),
            Err(TimecodeError::BadField(_))
        ));
        assert!(matches!(decode("0:00:01."), Err(TimecodeError::BadField(_))));
    }
}
