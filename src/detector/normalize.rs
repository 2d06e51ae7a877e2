/// Strip every whitespace character so labels and status text can be matched
/// regardless of how the page breaks lines between them.
///
/// "6880 站區\n\t已售完" → "6880站區已售完"
pub fn normalize(raw: &str) -> String {
    raw.chars().filter(|c| !c.is_whitespace()).collect()
}
