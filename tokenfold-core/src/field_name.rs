use crate::group::GroupKey;

/// Classification tables consulted when deriving policy-facing field names.
///
/// The tables are data, not code, so deployments with unusual issuers or
/// their own token namespaces can extend them without touching the
/// derivation algorithm.
#[derive(Debug, Clone)]
pub struct FieldNamePolicy {
    /// Mapping namespaces whose prefix is dropped from the type label.
    pub well_known_namespaces: Vec<String>,
    /// Leading DNS labels dropped from the issuer (identity-provider hosts
    /// conventionally sit under one of these).
    pub generic_host_prefixes: Vec<String>,
    /// Trailing DNS labels dropped from the issuer when final.
    pub generic_host_suffixes: Vec<String>,
}

impl Default for FieldNamePolicy {
    fn default() -> Self {
        FieldNamePolicy {
            well_known_namespaces: vec!["Jans".to_string()],
            generic_host_prefixes: ["idp", "accounts", "www", "auth", "login", "sso"]
                .map(String::from)
                .to_vec(),
            generic_host_suffixes: ["com", "net", "org", "io", "dev", "app", "edu", "gov"]
                .map(String::from)
                .to_vec(),
        }
    }
}

impl FieldNamePolicy {
    /// Derive the field name for one group: `{issuer_label}_{type_label}`,
    /// lowercase with underscores, deterministic for a given key.
    pub fn field_name(&self, key: &GroupKey) -> String {
        format!(
            "{}_{}",
            self.issuer_label(&key.issuer),
            self.type_label(&key.token_type)
        )
    }

    /// Reduce a DNS-like issuer to a short label.
    ///
    /// The issuer may be a bare host or a URL; only the host part counts.
    /// Leading generic labels are dropped, then the final label when it is a
    /// generic suffix: `idp.dolphin.sea` -> `dolphin_sea`,
    /// `https://accounts.google.com` -> `google`. When stripping would leave
    /// nothing, the full host is kept.
    fn issuer_label(&self, issuer: &str) -> String {
        let host = host_of(issuer);
        let mut labels: Vec<&str> = host.split('.').filter(|l| !l.is_empty()).collect();

        let kept = labels.clone();
        while let Some(first) = labels.first() {
            if self.generic_host_prefixes.iter().any(|p| p == first) {
                labels.remove(0);
            } else {
                break;
            }
        }
        if let Some(last) = labels.last() {
            if self.generic_host_suffixes.iter().any(|s| s == last) {
                labels.pop();
            }
        }
        if labels.is_empty() {
            labels = kept;
        }

        sanitize(&labels.join("_"))
    }

    /// Reduce a mapping string to a type label.
    ///
    /// Well-known namespaces drop their prefix (`Jans::Access_Token` ->
    /// `access_token`); custom namespaces keep it, lowercased, so two
    /// vendors' `DolphinToken` never collide (`Acme::DolphinToken` ->
    /// `acme_dolphin_token`). Mappings without a namespace separator are
    /// converted whole.
    fn type_label(&self, token_type: &str) -> String {
        match token_type.split_once("::") {
            Some((namespace, rest)) => {
                let rest = sanitize(&snake_case(rest));
                if self.well_known_namespaces.iter().any(|n| n == namespace) {
                    rest
                } else {
                    format!("{}_{}", sanitize(&snake_case(namespace)), rest)
                }
            }
            None => sanitize(&snake_case(token_type)),
        }
    }
}

fn host_of(issuer: &str) -> &str {
    let after_scheme = issuer
        .split_once("://")
        .map_or(issuer, |(_, rest)| rest);
    let host_port = after_scheme
        .split(['/', '?', '#'])
        .next()
        .unwrap_or(after_scheme);
    host_port.split(':').next().unwrap_or(host_port)
}

/// Pascal/mixed case to lowercase-with-underscores: `DolphinToken` ->
/// `dolphin_token`, `Access_Token` -> `access_token`.
fn snake_case(input: &str) -> String {
    let mut out = String::with_capacity(input.len() + 4);
    let mut prev_lower_or_digit = false;
    for ch in input.chars() {
        if ch.is_uppercase() {
            if prev_lower_or_digit {
                out.push('_');
            }
            out.extend(ch.to_lowercase());
            prev_lower_or_digit = false;
        } else {
            out.push(ch);
            prev_lower_or_digit = ch.is_lowercase() || ch.is_ascii_digit();
        }
    }
    out
}

/// Map every non-alphanumeric rune to `_` and collapse runs, so the result
/// is always a safe structural-access key.
fn sanitize(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut prev_underscore = false;
    for ch in input.chars() {
        if ch.is_ascii_alphanumeric() {
            out.push(ch.to_ascii_lowercase());
            prev_underscore = false;
        } else if !prev_underscore && !out.is_empty() {
            out.push('_');
            prev_underscore = true;
        }
    }
    while out.ends_with('_') {
        out.pop();
    }
    out
}
