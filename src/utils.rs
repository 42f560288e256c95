#[doc(hidden)]
pub trait PropconfStringUtil {
    /// `SOME_KEY` => `someKey`.
    fn to_camel_key(&self) -> String;

    /// `get_some_key` => `getSomeKey`, camel case input is kept.
    fn to_lower_camel(&self) -> String;

    /// `getSomeKey` => `someKey`, `isEnabled` => `enabled`.
    fn to_accessor_key(&self) -> String;
}

const ACCESSOR_PREFIXES: &[&str] = &["get", "is"];

fn lower_first(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) => c.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}

impl PropconfStringUtil for &str {
    fn to_camel_key(&self) -> String {
        let mut key = String::with_capacity(self.len());
        for (i, seg) in self.split('_').filter(|s| !s.is_empty()).enumerate() {
            let seg = seg.to_lowercase();
            if i == 0 {
                key.push_str(&seg);
            } else {
                let mut chars = seg.chars();
                if let Some(c) = chars.next() {
                    key.extend(c.to_uppercase());
                    key.push_str(chars.as_str());
                }
            }
        }
        key
    }

    fn to_lower_camel(&self) -> String {
        if !self.contains('_') {
            return self.to_string();
        }
        let lead = self.len() - self.trim_start_matches('_').len();
        let mut key = "_".repeat(lead);
        for (i, seg) in self.split('_').filter(|s| !s.is_empty()).enumerate() {
            if i == 0 {
                key.push_str(seg);
            } else {
                let mut chars = seg.chars();
                if let Some(c) = chars.next() {
                    key.extend(c.to_uppercase());
                    key.push_str(chars.as_str());
                }
            }
        }
        key
    }

    fn to_accessor_key(&self) -> String {
        let name = self.to_lower_camel();
        for prefix in ACCESSOR_PREFIXES {
            match name.strip_prefix(prefix) {
                Some(rest) if !rest.is_empty() => return lower_first(rest),
                _ => {}
            }
        }
        name
    }
}

#[cfg(test)]
mod tests {
    use crate::*;
    use quickcheck_macros::quickcheck;

    #[test]
    fn to_camel_key_test() {
        assert_eq!("someKey", "SOME_KEY".to_camel_key());
        assert_eq!("path", "PATH".to_camel_key());
        assert_eq!("javaHome", "JAVA_HOME".to_camel_key());
        assert_eq!("databaseUserName", "DATABASE__USER_NAME".to_camel_key());
        assert_eq!("name", "_NAME_".to_camel_key());
        assert_eq!("", "___".to_camel_key());
    }

    #[test]
    fn to_lower_camel_test() {
        assert_eq!("getStringValue", "get_string_value".to_lower_camel());
        assert_eq!("getStringValue", "getStringValue".to_lower_camel());
        assert_eq!("token", "token".to_lower_camel());
        assert_eq!("_private", "_private".to_lower_camel());
    }

    #[test]
    fn to_accessor_key_test() {
        assert_eq!("username", "getUsername".to_accessor_key());
        assert_eq!("enabled", "isEnabled".to_accessor_key());
        assert_eq!("token", "token".to_accessor_key());
        assert_eq!("stringValue", "getStringValue".to_accessor_key());
        assert_eq!("stringValue", "get_string_value".to_accessor_key());
        assert_eq!("x", "get_x".to_accessor_key());
        assert_eq!("get", "get".to_accessor_key());
        assert_eq!("is", "is".to_accessor_key());
        assert_eq!("land", "island".to_accessor_key());
        assert_eq!("ter", "getter".to_accessor_key());
        assert_eq!("value", "is_value".to_accessor_key());
    }

    #[quickcheck]
    fn camel_key_has_no_separator(key: String) -> bool {
        !(&key[..]).to_camel_key().contains('_')
    }
}
