use crate::app::song::{Artist, LibrarySnapshot};

/// Paged, letter-filtered view over the snapshot's artists.
///
/// Holds indices into [`LibrarySnapshot::artists`], which are already in
/// canonical (case-insensitive) order, so filtering keeps that order.
#[derive(Debug, Clone)]
pub struct ArtistPager {
    page_size: usize,
    /// 1-based
    current_page: usize,
    filter: Option<char>,
    filtered: Vec<usize>,
}

impl ArtistPager {
    pub fn new(page_size: usize) -> Self {
        Self {
            page_size: page_size.max(1),
            current_page: 1,
            filter: None,
            filtered: Vec::new(),
        }
    }

    /// Recompute the filtered sequence for a newly installed snapshot,
    /// keeping the active filter and returning to page 1.
    pub fn rebuild(&mut self, snapshot: &LibrarySnapshot) {
        self.set_filter(snapshot, self.filter);
    }

    /// Apply a letter filter (`None` shows every artist) and reset to page 1.
    pub fn set_filter(&mut self, snapshot: &LibrarySnapshot, letter: Option<char>) {
        let letter = letter.and_then(|c| c.to_uppercase().next());
        self.filtered = snapshot
            .artists()
            .iter()
            .enumerate()
            .filter(|(_, artist)| letter.is_none() || artist.initial() == letter)
            .map(|(i, _)| i)
            .collect();
        self.filter = letter;
        self.current_page = 1;
        log::debug!(
            "Artist filter {:?}: {} artists, {} pages",
            self.filter,
            self.filtered.len(),
            self.total_pages()
        );
    }

    pub fn filter(&self) -> Option<char> {
        self.filter
    }

    pub fn current_page(&self) -> usize {
        self.current_page
    }

    pub fn filtered_len(&self) -> usize {
        self.filtered.len()
    }

    /// Never less than 1, even with no matching artists.
    pub fn total_pages(&self) -> usize {
        self.filtered.len().div_ceil(self.page_size).max(1)
    }

    pub fn has_next_page(&self) -> bool {
        self.current_page < self.total_pages()
    }

    pub fn has_prev_page(&self) -> bool {
        self.current_page > 1
    }

    /// Advance one page; returns whether the page changed.
    pub fn next_page(&mut self) -> bool {
        if !self.has_next_page() {
            return false;
        }
        self.current_page += 1;
        true
    }

    /// Go back one page; returns whether the page changed.
    pub fn prev_page(&mut self) -> bool {
        if !self.has_prev_page() {
            return false;
        }
        self.current_page -= 1;
        true
    }

    /// Snapshot indices of the artists on the current page.
    pub fn visible_slice(&self) -> &[usize] {
        let start = (self.current_page - 1) * self.page_size;
        let end = (start + self.page_size).min(self.filtered.len());
        self.filtered.get(start..end).unwrap_or(&[])
    }

    pub fn visible_artists<'a>(&self, snapshot: &'a LibrarySnapshot) -> Vec<&'a Artist> {
        self.visible_slice()
            .iter()
            .filter_map(|&i| snapshot.artists().get(i))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::song::LibraryResponse;

    fn snapshot_with(names: &[&str]) -> LibrarySnapshot {
        LibrarySnapshot::from_response(LibraryResponse {
            artists: names
                .iter()
                .map(|name| Artist {
                    name: name.to_string(),
                    ..Default::default()
                })
                .collect(),
            ..Default::default()
        })
    }

    fn numbered(count: usize) -> LibrarySnapshot {
        let names: Vec<String> = (0..count).map(|i| format!("Artist {:03}", i)).collect();
        let refs: Vec<&str> = names.iter().map(String::as_str).collect();
        snapshot_with(&refs)
    }

    fn visible_names(pager: &ArtistPager, snapshot: &LibrarySnapshot) -> Vec<String> {
        pager
            .visible_artists(snapshot)
            .iter()
            .map(|a| a.name.clone())
            .collect()
    }

    #[test]
    fn test_single_page_in_canonical_order() {
        let snapshot = snapshot_with(&["Bono", "Zoe", "adele"]);
        let mut pager = ArtistPager::new(10);
        pager.rebuild(&snapshot);

        assert_eq!(visible_names(&pager, &snapshot), vec!["adele", "Bono", "Zoe"]);
        assert_eq!(pager.total_pages(), 1);
        assert!(!pager.has_next_page());
        assert!(!pager.has_prev_page());
    }

    #[test]
    fn test_total_pages_formula() {
        for page_size in 1..=7 {
            for count in 0..=25 {
                let snapshot = numbered(count);
                let mut pager = ArtistPager::new(page_size);
                pager.rebuild(&snapshot);

                let expected = count.div_ceil(page_size).max(1);
                assert_eq!(pager.total_pages(), expected, "N={} P={}", count, page_size);

                loop {
                    assert!(pager.visible_slice().len() <= page_size);
                    if !pager.next_page() {
                        break;
                    }
                }
            }
        }
    }

    #[test]
    fn test_pages_cover_every_artist_once() {
        let snapshot = numbered(23);
        let mut pager = ArtistPager::new(5);
        pager.rebuild(&snapshot);

        let mut seen = Vec::new();
        loop {
            seen.extend_from_slice(pager.visible_slice());
            if !pager.next_page() {
                break;
            }
        }
        assert_eq!(seen, (0..23).collect::<Vec<_>>());
        assert_eq!(pager.visible_slice().len(), 3);
    }

    #[test]
    fn test_navigation_is_noop_at_bounds() {
        let snapshot = numbered(12);
        let mut pager = ArtistPager::new(5);
        pager.rebuild(&snapshot);

        assert!(!pager.prev_page());
        assert_eq!(pager.current_page(), 1);

        assert!(pager.next_page());
        assert!(pager.next_page());
        assert_eq!(pager.current_page(), 3);
        assert!(!pager.next_page());
        assert_eq!(pager.current_page(), 3);
    }

    #[test]
    fn test_filter_selects_by_uppercased_initial() {
        let snapshot = snapshot_with(&["adele", "Abba", "Bono", "aha", "Zoe"]);
        let mut pager = ArtistPager::new(10);
        pager.rebuild(&snapshot);

        pager.set_filter(&snapshot, Some('A'));
        assert_eq!(visible_names(&pager, &snapshot), vec!["Abba", "adele", "aha"]);

        // Lowercase input is normalised
        pager.set_filter(&snapshot, Some('z'));
        assert_eq!(pager.filter(), Some('Z'));
        assert_eq!(visible_names(&pager, &snapshot), vec!["Zoe"]);

        pager.set_filter(&snapshot, None);
        assert_eq!(pager.filtered_len(), 5);
        assert_eq!(
            visible_names(&pager, &snapshot),
            vec!["Abba", "adele", "aha", "Bono", "Zoe"]
        );
    }

    #[test]
    fn test_filter_resets_page() {
        let snapshot = numbered(30);
        let mut pager = ArtistPager::new(5);
        pager.rebuild(&snapshot);
        pager.next_page();
        pager.next_page();

        pager.set_filter(&snapshot, Some('A'));
        assert_eq!(pager.current_page(), 1);
    }

    #[test]
    fn test_empty_filter_result() {
        let snapshot = snapshot_with(&["Bono", "Zoe"]);
        let mut pager = ArtistPager::new(10);
        pager.set_filter(&snapshot, Some('Q'));

        assert_eq!(pager.total_pages(), 1);
        assert!(pager.visible_slice().is_empty());
        assert!(!pager.has_next_page());
        assert!(!pager.has_prev_page());
        assert!(!pager.next_page());
        assert!(!pager.prev_page());
    }

    #[test]
    fn test_zero_page_size_is_clamped() {
        let snapshot = numbered(3);
        let mut pager = ArtistPager::new(0);
        pager.rebuild(&snapshot);
        assert_eq!(pager.total_pages(), 3);
        assert_eq!(pager.visible_slice().len(), 1);
    }
}
