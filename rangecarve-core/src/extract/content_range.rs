use crate::domain::ArtifactKey;
use crate::error::ExtractError;

const HTTP_PREFIX: &[u8] = b"HTTP";
const CRLF: &[u8] = b"\r\n";
const HEADER_NAME: &str = "Content-Range";
const UNIT_PREFIX: &str = "bytes ";

/// True when the segment opens an HTTP response (status line in view).
#[inline]
pub fn is_response_start(payload: &[u8]) -> bool {
    payload.len() > HTTP_PREFIX.len() && payload.starts_with(HTTP_PREFIX)
}

/// Split on CRLF. A payload without CRLF is a single line.
pub fn crlf_lines(payload: &[u8]) -> impl Iterator<Item = &[u8]> {
    let mut rest = Some(payload);
    std::iter::from_fn(move || {
        let cur = rest?;
        match cur.windows(CRLF.len()).position(|w| w == CRLF) {
            Some(i) => {
                rest = Some(&cur[i + CRLF.len()..]);
                Some(&cur[..i])
            }
            None => {
                rest = None;
                Some(cur)
            }
        }
    })
}

/// Parsed header segment: which artifact it starts and the body bytes it
/// carries. Only the final CRLF-delimited line counts as body.
#[derive(Debug, PartialEq, Eq)]
pub struct RangeResponse<'a> {
    pub key: ArtifactKey,
    pub body: &'a [u8],
}

pub fn parse_response(payload: &[u8]) -> Result<RangeResponse<'_>, ExtractError> {
    let value = crlf_lines(payload)
        .filter_map(|line| {
            let colon = line.iter().position(|b| *b == b':')?;
            (&line[..colon] == HEADER_NAME.as_bytes()).then(|| &line[colon + 1..])
        })
        .next()
        .ok_or_else(|| ExtractError::MalformedContentRange("header missing".into()))?;

    let key = parse_value(&String::from_utf8_lossy(value))?;
    let body = crlf_lines(payload).last().unwrap_or_default();
    Ok(RangeResponse { key, body })
}

/// `[bytes ]<range>/<total>` -> (file_id = total, range_id = range)
pub fn parse_value(raw: &str) -> Result<ArtifactKey, ExtractError> {
    let v = raw.trim();
    let v = v.strip_prefix(UNIT_PREFIX).unwrap_or(v);
    let mut parts = v.split('/');
    let (Some(range), Some(total)) = (parts.next(), parts.next()) else {
        return Err(ExtractError::MalformedContentRange(raw.trim().to_string()));
    };
    if !is_safe_component(range) || !is_safe_component(total) {
        return Err(ExtractError::MalformedContentRange(raw.trim().to_string()));
    }
    Ok(ArtifactKey {
        file_id: total.to_string(),
        range_id: range.to_string(),
    })
}

// Components become directory and file names under the output root.
fn is_safe_component(s: &str) -> bool {
    !s.is_empty()
        && s != "."
        && s != ".."
        && !s.contains(['/', '\\', '\0'])
}
