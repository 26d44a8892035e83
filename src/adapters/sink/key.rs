//! Object key layout

use crate::domain::BatchTag;
use chrono::NaiveDate;
use std::fmt;
use url::form_urlencoded;

/// Key of one sink object: `<prefix>/<yyyy-mm-dd>/<batchTag>`
///
/// The key depends only on the batch, so writing the same batch twice
/// targets the same object. The batch tag is percent-encoded into a single
/// segment since the server treats it as opaque.
///
/// # Examples
///
/// ```
/// use keyfed::adapters::sink::ObjectKey;
/// use keyfed::domain::BatchTag;
/// use chrono::NaiveDate;
///
/// let key = ObjectKey::for_batch(
///     "nearform/",
///     NaiveDate::from_ymd_opt(2021, 3, 4).unwrap(),
///     &BatchTag::new("abc").unwrap(),
/// );
/// assert_eq!(key.as_str(), "nearform/2021-03-04/abc");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectKey(String);

impl ObjectKey {
    pub fn for_batch(prefix: &str, date: NaiveDate, tag: &BatchTag) -> Self {
        let prefix = prefix.trim_matches('/');
        let date = date.format("%Y-%m-%d");
        let tag = encode_segment(tag.as_str());
        if prefix.is_empty() {
            Self(format!("{date}/{tag}"))
        } else {
            Self(format!("{prefix}/{date}/{tag}"))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Path segments of the key
    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.0.split('/')
    }
}

/// Percent-encode an opaque value so it can never split into segments or
/// climb out of its directory
fn encode_segment(raw: &str) -> String {
    let encoded: String = form_urlencoded::byte_serialize(raw.as_bytes()).collect();
    if encoded.chars().all(|c| c == '.') {
        encoded.replace('.', "%2E")
    } else {
        encoded
    }
}

impl fmt::Display for ObjectKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for ObjectKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_prefix() {
        let key = ObjectKey::for_batch(
            "",
            NaiveDate::from_ymd_opt(2021, 3, 4).unwrap(),
            &BatchTag::new("t").unwrap(),
        );
        assert_eq!(key.as_str(), "2021-03-04/t");
    }

    #[test]
    fn test_tag_stays_one_segment() {
        let date = NaiveDate::from_ymd_opt(2021, 3, 4).unwrap();
        let key = |t: &str| ObjectKey::for_batch("p", date, &BatchTag::new(t).unwrap());

        assert_eq!(key("..").as_str(), "p/2021-03-04/%2E%2E");
        assert_eq!(key("a/../b").as_str(), "p/2021-03-04/a%2F..%2Fb");
        assert_eq!(key("tag/").as_str(), "p/2021-03-04/tag%2F");
        assert_eq!(key("a//b").segments().count(), 3);
        assert_eq!(
            key("75b326f7-ae6f-42f6-9354-00c0a6b797b3").as_str(),
            "p/2021-03-04/75b326f7-ae6f-42f6-9354-00c0a6b797b3"
        );
    }

    #[test]
    fn test_same_batch_same_key() {
        let date = NaiveDate::from_ymd_opt(2021, 3, 4).unwrap();
        let tag = BatchTag::new("t").unwrap();
        assert_eq!(
            ObjectKey::for_batch("p", date, &tag),
            ObjectKey::for_batch("/p/", date, &tag)
        );
    }
}
