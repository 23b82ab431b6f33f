/// Options a picker shows for the current search text: names containing
/// `search` case-insensitively, minus the ones already selected.
pub fn visible_options<'a, S: AsRef<str>>(
    options: &[&'a str],
    selected: &[S],
    search: &str,
) -> Vec<&'a str> {
    let needle = search.to_lowercase();
    options
        .iter()
        .copied()
        .filter(|option| !selected.iter().any(|chosen| chosen.as_ref() == *option))
        .filter(|option| needle.is_empty() || option.to_lowercase().contains(&needle))
        .collect()
}
