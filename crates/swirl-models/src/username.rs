//! Username derivation for first-time sign-ins.

use uuid::Uuid;

const ADJECTIVES: [&str; 12] = [
    "brave", "calm", "eager", "fancy", "gentle", "happy", "jolly", "lively", "mighty", "quiet",
    "swift", "witty",
];

const ANIMALS: [&str; 12] = [
    "otter", "panda", "koala", "falcon", "lynx", "walrus", "gecko", "heron", "bison", "lemur",
    "marmot", "puffin",
];

/// Derive a username from an identity-provider display name.
///
/// All whitespace is removed and the result lower-cased. Returns `None`
/// when nothing is left.
pub fn derive_username(display_name: &str) -> Option<String> {
    let name: String = display_name
        .chars()
        .filter(|c| !c.is_whitespace())
        .flat_map(char::to_lowercase)
        .collect();

    if name.is_empty() {
        None
    } else {
        Some(name)
    }
}

/// Random placeholder username, e.g. `swiftotter3fa2c91b`.
pub fn placeholder_username() -> String {
    let id = Uuid::new_v4();
    let bytes = id.as_bytes();
    let adjective = ADJECTIVES[bytes[0] as usize % ADJECTIVES.len()];
    let animal = ANIMALS[bytes[1] as usize % ANIMALS.len()];
    let suffix: String = id.simple().to_string().chars().skip(4).take(8).collect();
    format!("{}{}{}", adjective, animal, suffix)
}
