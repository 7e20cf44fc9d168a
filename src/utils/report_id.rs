use rand::Rng;

/// Largest sequence number a report ID can carry (6 digits).
const MAX_SEQUENCE: u32 = 999_999;

/// Build a tracking identifier of the form `CR-<year>-<NNNNNN>`.
///
/// The number is drawn uniformly from `0..=999999`. Nothing here checks
/// the store, so two calls may collide; the unique index on `report_id`
/// catches that and the caller retries.
pub fn generate_report_id<R: Rng + ?Sized>(year: i32, rng: &mut R) -> String {
    let n = rng.gen_range(0..=MAX_SEQUENCE);
    format!("CR-{}-{:06}", year, n)
}

/// `CR-` + four-digit year + `-` + six digits.
pub fn is_valid_report_id(id: &str) -> bool {
    let Some(rest) = id.strip_prefix("CR-") else {
        return false;
    };
    let Some((year, seq)) = rest.split_once('-') else {
        return false;
    };
    year.len() == 4
        && seq.len() == 6
        && year.bytes().all(|b| b.is_ascii_digit())
        && seq.bytes().all(|b| b.is_ascii_digit())
}
