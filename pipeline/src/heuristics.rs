//! Text heuristics for garment tags.
//!
//! Used on recognized label text and, during fusion, on the remote
//! suggestion text. All matching is case-insensitive unless noted.

use once_cell::sync::Lazy;
use regex::Regex;

/// Brands recognised on tags, in their canonical spelling.
const KNOWN_BRANDS: &[&str] = &[
    "Louis Vuitton",
    "Banana Republic",
    "Eileen Fisher",
    "Organic Basics",
    "Ralph Lauren",
    "Tommy Hilfiger",
    "Calvin Klein",
    "The North Face",
    "Acne Studios",
    "Gucci",
    "Prada",
    "Chanel",
    "Hermes",
    "Theory",
    "Everlane",
    "Reformation",
    "Patagonia",
    "J.Crew",
    "Zara",
    "H&M",
    "Uniqlo",
    "Madewell",
    "Tentree",
    "Kotn",
    "Kuyichi",
    "Levi's",
    "Nike",
    "Adidas",
    "Lululemon",
    "Carhartt",
    "Gap",
    "Mango",
    "COS",
];

/// Compiled brand matchers, longest names first so multi-word brands win.
static BRAND_PATTERNS: Lazy<Vec<(Regex, &'static str)>> = Lazy::new(|| {
    let mut brands: Vec<&'static str> = KNOWN_BRANDS.to_vec();
    brands.sort_by_key(|b| std::cmp::Reverse(b.len()));
    brands
        .into_iter()
        .filter_map(|brand| {
            let pattern = format!(r"(?i)(?:^|[^\w]){}(?:$|[^\w])", regex::escape(brand).replace("'", "['’]?"));
            Regex::new(&pattern).ok().map(|re| (re, brand))
        })
        .collect()
});

static EXPLICIT_BRAND: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?im)\bbrand\s*[:\-]\s*([A-Za-z0-9&'. ]{2,40}?)\s*(?:$|[,;|])").expect("brand pattern"));

static EXPLICIT_SIZE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\bsize\b\s*[:\-]?\s*(XXXL|XXL|XXS|XL|XS|S|M|L|\d{1,2}(?:\.5)?)\b").expect("size pattern")
});

static WAIST_LENGTH: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)\bW\s*(\d{2})\s*/?\s*L\s*(\d{2})\b").expect("waist/length pattern"));

static REGIONAL_SIZE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\b(EU|US|UK|AU|IT|FR)\s*(\d{1,2}(?:\.5)?)\b").expect("regional size pattern"));

// Uppercase only, and delimited by whitespace or punctuation so the "S" in
// "LEVI'S" does not count
static LETTER_SIZE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?:^|[\s/(,])(XXXL|XXL|XXS|XL|XS|S|M|L)(?:$|[\s/),])").expect("letter size pattern"));

static COMPOSITION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(\d{1,3})\s*%\s*((?:recycled|organic|virgin|pima|supima)\s+)?([a-z]+)").expect("composition pattern")
});

const MATERIAL_KEYWORDS: &[&str] = &[
    "cashmere", "merino", "wool", "silk", "linen", "cotton", "denim", "leather", "suede", "polyester",
    "nylon", "viscose", "rayon", "elastane", "spandex", "acrylic", "hemp", "lyocell", "tencel",
    "alpaca", "mohair",
];

static MATERIAL_KEYWORD: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(r"(?i)\b({})\b", MATERIAL_KEYWORDS.join("|"))).expect("material keyword pattern")
});

static CARE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)\b(machine wash|hand wash|dry clean|do not (?:bleach|tumble|iron|wring|dry clean)|tumble dry|line dry|dry flat|iron (?:low|medium|high|on reverse)|wash (?:at|cold|warm|inside out)|\d{2}\s*°\s*c?)",
    )
    .expect("care pattern")
});

/// Known brand, or the value of an explicit `Brand:` marker.
pub fn extract_brand(text: &str) -> Option<String> {
    if let Some(brand) = BRAND_PATTERNS
        .iter()
        .find(|(re, _)| re.is_match(text))
        .map(|(_, brand)| brand.to_string())
    {
        return Some(brand);
    }

    EXPLICIT_BRAND
        .captures(text)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().trim().to_string())
        .filter(|b| !b.is_empty())
}

/// Size in its tag spelling: `M`, `EU 38`, `W32 L34`, `10`.
///
/// Checked in order: explicit `Size` marker, waist/length, regional numeric,
/// bare letter size.
pub fn extract_size(text: &str) -> Option<String> {
    if let Some(c) = EXPLICIT_SIZE.captures(text) {
        return Some(c[1].to_uppercase());
    }
    if let Some(c) = WAIST_LENGTH.captures(text) {
        return Some(format!("W{} L{}", &c[1], &c[2]));
    }
    if let Some(c) = REGIONAL_SIZE.captures(text) {
        return Some(format!("{} {}", c[1].to_uppercase(), &c[2]));
    }
    LETTER_SIZE.captures(text).map(|c| c[1].to_string())
}

/// Fibre composition (`60% Cotton, 40% Polyester`) or the first material keyword.
pub fn extract_material(text: &str) -> Option<String> {
    let parts: Vec<String> = COMPOSITION
        .captures_iter(text)
        .filter(|c| c[1].parse::<u8>().map(|p| p > 0 && p <= 100).unwrap_or(false))
        .map(|c| {
            let qualifier = c.get(2).map(|q| format!("{} ", title_case(q.as_str().trim()))).unwrap_or_default();
            format!("{}% {}{}", &c[1], qualifier, title_case(&c[3]))
        })
        .collect();
    if !parts.is_empty() {
        return Some(parts.join(", "));
    }

    MATERIAL_KEYWORD.captures(text).map(|c| title_case(&c[1]))
}

/// Lines that read as care instructions, trimmed and de-duplicated.
pub fn extract_care<S: AsRef<str>>(lines: &[S]) -> Vec<String> {
    let mut care: Vec<String> = Vec::new();
    for line in lines {
        let line = line.as_ref().trim();
        if CARE.is_match(line) && !care.iter().any(|c| c.eq_ignore_ascii_case(line)) {
            care.push(line.to_string());
        }
    }
    care
}

fn title_case(word: &str) -> String {
    let lower = word.to_lowercase();
    let mut chars = lower.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
