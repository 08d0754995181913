//! The RADIX component: an ordered index from canonical name to
//! [`DomainId`], replacing NSD's red-black tree (`domain_table`'s
//! `names_to_domains` heap) with a `BTreeMap` keyed on `Name`'s canonical
//! `Ord` impl.
//!
//! Canonical name order compares labels root-to-leaf, so every descendant
//! of a given name shares its ordering prefix and sorts contiguously —
//! the same contiguity property NSD gets from its tree, here for free from
//! `BTreeMap::range`.

use std::collections::BTreeMap;

use nsd_proto::rr::Name;

use crate::domain::DomainId;

#[derive(Debug, Default)]
pub struct RadixTree {
    names: BTreeMap<Name, DomainId>,
}

impl RadixTree {
    pub fn new() -> Self {
        RadixTree { names: BTreeMap::new() }
    }

    pub fn insert(&mut self, name: Name, id: DomainId) {
        self.names.insert(name, id);
    }

    pub fn get(&self, name: &Name) -> Option<DomainId> {
        self.names.get(name).copied()
    }

    pub fn remove(&mut self, name: &Name) {
        self.names.remove(name);
    }

    /// True if some name strictly below `name` is present in the tree —
    /// `domain_can_be_deleted`'s "has children domains" check in
    /// `namedb.c`. Canonical order puts every descendant immediately after
    /// `name` itself, so the very next entry (if any) settles it.
    pub fn has_descendants(&self, name: &Name) -> bool {
        self.names
            .range((std::ops::Bound::Excluded(name.clone()), std::ops::Bound::Unbounded))
            .next()
            .is_some_and(|(next, _)| next.is_subdomain(name))
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// NSD's `domain_table_search`: finds the closest ancestor of `name`
    /// already present in the tree, walking from `name` up to (and
    /// including) the root. Returns that ancestor's id and whether the
    /// match was exact.
    pub fn closest_encloser(&self, name: &Name) -> Option<(DomainId, bool)> {
        let mut candidate = name.clone();
        let mut exact = true;
        loop {
            if let Some(&id) = self.names.get(&candidate) {
                return Some((id, exact));
            }
            exact = false;
            match candidate.parent() {
                Some(parent) => candidate = parent,
                None => return None,
            }
        }
    }

    /// All `(name, id)` pairs at or below `apex`, in canonical order —
    /// the walk order AXFR streams a zone's content in.
    pub fn zone_names<'a>(&'a self, apex: &'a Name) -> impl Iterator<Item = (&'a Name, DomainId)> + 'a {
        self.names
            .range(apex.clone()..)
            .take_while(move |(name, _)| name.is_subdomain(apex))
            .map(|(name, &id)| (name, id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::region::Region;

    fn insert_name(tree: &mut RadixTree, region: &mut Region<crate::domain::Domain>, text: &str) -> DomainId {
        let name = Name::parse(text, None).unwrap();
        let id = region.alloc(crate::domain::Domain::new(name.clone(), None, region.len() as u32));
        tree.insert(name, id);
        id
    }

    #[test]
    fn exact_match_reports_exact_true() {
        let mut tree = RadixTree::new();
        let mut region: Region<crate::domain::Domain> = Region::new();
        let id = insert_name(&mut tree, &mut region, "example.com.");
        let (found, exact) = tree.closest_encloser(&Name::parse("example.com.", None).unwrap()).unwrap();
        assert_eq!(found, id);
        assert!(exact);
    }

    #[test]
    fn missing_name_finds_nearest_ancestor() {
        let mut tree = RadixTree::new();
        let mut region: Region<crate::domain::Domain> = Region::new();
        let apex = insert_name(&mut tree, &mut region, "example.com.");
        let (found, exact) = tree
            .closest_encloser(&Name::parse("missing.example.com.", None).unwrap())
            .unwrap();
        assert_eq!(found, apex);
        assert!(!exact);
    }

    #[test]
    fn zone_names_are_contiguous_and_exclude_other_zones() {
        let mut tree = RadixTree::new();
        let mut region: Region<crate::domain::Domain> = Region::new();
        insert_name(&mut tree, &mut region, "example.com.");
        insert_name(&mut tree, &mut region, "www.example.com.");
        insert_name(&mut tree, &mut region, "mail.example.com.");
        insert_name(&mut tree, &mut region, "other.org.");

        let apex = Name::parse("example.com.", None).unwrap();
        let names: Vec<String> = tree.zone_names(&apex).map(|(n, _)| n.to_string()).collect();
        assert_eq!(names.len(), 3);
        assert!(names.iter().all(|n| n.ends_with("example.com.")));
    }
}
