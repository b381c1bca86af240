/// Reject request paths whose matching result could differ from what the
/// downstream service resolves.
///
/// `/challenges/../users/42` would hit the public `/challenges/**` rule while
/// the upstream may normalise it to `/users/42`, so any dot segment, empty
/// segment, backslash, path parameter (`;`) or encoded separator/dot is refused
/// before rules are evaluated.
pub fn is_canonical(path: &str) -> bool {
    if !path.starts_with('/') {
        return false;
    }
    if path.contains("//") || path.contains('\\') || path.contains(';') {
        return false;
    }

    let lowered = path.to_ascii_lowercase();
    if ["%2e", "%2f", "%5c", "%3b", "%25"]
        .iter()
        .any(|encoded| lowered.contains(encoded))
    {
        return false;
    }

    !path
        .split('/')
        .any(|segment| segment == "." || segment == "..")
}
