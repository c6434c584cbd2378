/// A row of the process picker.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProcessEntry {
    pub pid: u32,
    pub name: String,
    pub user: String,
}

pub fn sort_entries(entries: &mut [ProcessEntry]) {
    entries.sort_by(|a, b| {
        a.name
            .to_lowercase()
            .cmp(&b.name.to_lowercase())
            .then(a.pid.cmp(&b.pid))
    });
}

/// Case-insensitive match on name, user, or pid prefix.
pub fn filter_entries<'a>(entries: &'a [ProcessEntry], query: &str) -> Vec<&'a ProcessEntry> {
    let query = query.trim().to_lowercase();
    if query.is_empty() {
        return entries.iter().collect();
    }
    entries
        .iter()
        .filter(|e| {
            e.name.to_lowercase().contains(&query)
                || e.user.to_lowercase().contains(&query)
                || e.pid.to_string().starts_with(&query)
        })
        .collect()
}
