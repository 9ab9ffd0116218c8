//! Compressed Sparse Row (CSR) link graph representation
//!
//! CSR is optimized for iteration over neighbors, which is exactly what
//! power iteration needs. The graph keeps two CSR tables: outgoing links
//! for the transition model and incoming links for the rank recurrence.
//! Both are computed once at construction and never mutated.

use rustc_hash::FxHashMap;

use super::builder::LinkGraphBuilder;
use crate::errors::{RankError, Result};

/// A directed link graph in Compressed Sparse Row format
///
/// Node IDs are assigned in lexicographic page order, so iterating
/// `0..num_nodes` visits the universe in a reproducible order. Every row
/// is sorted by target ID.
#[derive(Debug, Clone)]
pub struct CsrGraph {
    /// Number of pages
    pub num_nodes: usize,
    /// Row pointers: node i's outgoing links are at row_ptr[i]..row_ptr[i+1]
    pub row_ptr: Vec<usize>,
    /// Target node for each outgoing link
    pub col_idx: Vec<u32>,
    /// Row pointers for the incoming table
    pub in_row_ptr: Vec<usize>,
    /// Source node for each incoming link
    pub in_col_idx: Vec<u32>,
    /// Out-degree for each node
    pub out_degree: Vec<u32>,
    /// Page identifier for each node
    pub pages: Vec<String>,
    page_to_id: FxHashMap<String, u32>,
}

impl CsrGraph {
    /// Convert a LinkGraphBuilder into CSR format
    pub fn from_builder(builder: &LinkGraphBuilder) -> Self {
        let num_nodes = builder.node_count();
        let builder_nodes: Vec<_> = builder.nodes().map(|(_, node)| node).collect();

        // Lexicographic order of pages becomes the CSR id order
        let mut order: Vec<usize> = (0..num_nodes).collect();
        order.sort_by(|&a, &b| builder_nodes[a].page.cmp(&builder_nodes[b].page));
        let mut remap = vec![0u32; num_nodes];
        for (new_id, &old_id) in order.iter().enumerate() {
            remap[old_id] = new_id as u32;
        }

        let mut row_ptr = Vec::with_capacity(num_nodes + 1);
        let mut col_idx = Vec::with_capacity(builder.link_count());
        let mut out_degree = Vec::with_capacity(num_nodes);
        let mut pages = Vec::with_capacity(num_nodes);
        let mut in_degree = vec![0usize; num_nodes];

        row_ptr.push(0);

        for &old_id in &order {
            let node = builder_nodes[old_id];
            pages.push(node.page.clone());

            // Collect and sort links for deterministic iteration
            let mut links: Vec<u32> = node.links.iter().map(|&t| remap[t as usize]).collect();
            links.sort_unstable();

            out_degree.push(links.len() as u32);
            for target in links {
                in_degree[target as usize] += 1;
                col_idx.push(target);
            }

            row_ptr.push(col_idx.len());
        }

        let (in_row_ptr, in_col_idx) = Self::transpose(&row_ptr, &col_idx, &in_degree);

        let page_to_id = pages
            .iter()
            .enumerate()
            .map(|(i, p)| (p.clone(), i as u32))
            .collect();

        Self {
            num_nodes,
            row_ptr,
            col_idx,
            in_row_ptr,
            in_col_idx,
            out_degree,
            pages,
            page_to_id,
        }
    }

    /// Build the incoming table. Sources are visited in ascending order,
    /// so each incoming row comes out sorted.
    fn transpose(row_ptr: &[usize], col_idx: &[u32], in_degree: &[usize]) -> (Vec<usize>, Vec<u32>) {
        let mut in_row_ptr = Vec::with_capacity(in_degree.len() + 1);
        in_row_ptr.push(0);
        for &d in in_degree {
            let last = in_row_ptr[in_row_ptr.len() - 1];
            in_row_ptr.push(last + d);
        }

        let mut cursor = in_row_ptr[..in_degree.len()].to_vec();
        let mut in_col_idx = vec![0u32; col_idx.len()];
        for source in 0..in_degree.len() {
            for &target in &col_idx[row_ptr[source]..row_ptr[source + 1]] {
                in_col_idx[cursor[target as usize]] = source as u32;
                cursor[target as usize] += 1;
            }
        }

        (in_row_ptr, in_col_idx)
    }

    /// Build a graph from a corpus mapping page -> linked pages
    ///
    /// The corpus must already satisfy the ingestion contract: every link
    /// target is a page of the corpus and no page links to itself.
    /// Duplicate links collapse into one.
    ///
    /// # Errors
    /// - [`RankError::UnknownPage`] if a link points outside the corpus
    /// - [`RankError::InvalidCorpus`] for a self-link or a repeated page
    pub fn from_corpus<I, P, L, T>(corpus: I) -> Result<Self>
    where
        I: IntoIterator<Item = (P, L)>,
        P: AsRef<str>,
        L: IntoIterator<Item = T>,
        T: AsRef<str>,
    {
        let entries = collect_corpus(corpus);
        let mut builder = LinkGraphBuilder::with_capacity(entries.len());

        for (page, _) in &entries {
            if builder.get_node_id(page).is_some() {
                return Err(RankError::InvalidCorpus(format!("duplicate page {page:?}")));
            }
            builder.add_page(page);
        }

        for (page, links) in &entries {
            let from = builder.add_page(page);
            for link in links {
                if link == page {
                    return Err(RankError::InvalidCorpus(format!(
                        "page {page:?} links to itself"
                    )));
                }
                let to = builder
                    .get_node_id(link)
                    .ok_or_else(|| RankError::UnknownPage(link.clone()))?;
                builder.add_link(from, to);
            }
        }

        Ok(Self::from_builder(&builder))
    }

    /// Build a graph from a raw corpus, normalizing it first
    ///
    /// Self-links and links to pages outside the corpus are dropped rather
    /// than rejected. Repeated pages merge their links.
    pub fn from_corpus_lossy<I, P, L, T>(corpus: I) -> Self
    where
        I: IntoIterator<Item = (P, L)>,
        P: AsRef<str>,
        L: IntoIterator<Item = T>,
        T: AsRef<str>,
    {
        let entries = collect_corpus(corpus);
        let mut builder = LinkGraphBuilder::with_capacity(entries.len());

        for (page, _) in &entries {
            builder.add_page(page);
        }

        let mut dropped = 0usize;
        for (page, links) in &entries {
            let from = builder.add_page(page);
            for link in links {
                match builder.get_node_id(link) {
                    Some(to) if to != from => {
                        builder.add_link(from, to);
                    }
                    _ => dropped += 1,
                }
            }
        }

        #[cfg(feature = "tracing")]
        if dropped > 0 {
            tracing::warn!(dropped, "dropped self-links and links leaving the corpus");
        }
        #[cfg(not(feature = "tracing"))]
        let _ = dropped;

        Self::from_builder(&builder)
    }

    /// Outgoing neighbors of a node, sorted
    pub fn neighbors(&self, node: u32) -> &[u32] {
        let start = self.row_ptr[node as usize];
        let end = self.row_ptr[node as usize + 1];
        &self.col_idx[start..end]
    }

    /// Incoming neighbors of a node, sorted
    pub fn in_neighbors(&self, node: u32) -> &[u32] {
        let start = self.in_row_ptr[node as usize];
        let end = self.in_row_ptr[node as usize + 1];
        &self.in_col_idx[start..end]
    }

    /// Get the out-degree of a node
    pub fn degree(&self, node: u32) -> u32 {
        self.out_degree[node as usize]
    }

    /// Get the page identifier for a node
    pub fn page(&self, node: u32) -> &str {
        &self.pages[node as usize]
    }

    /// Get node ID by page
    pub fn get_node_by_page(&self, page: &str) -> Option<u32> {
        self.page_to_id.get(page).copied()
    }

    /// Get node ID by page, failing with [`RankError::UnknownPage`]
    pub fn node_id(&self, page: &str) -> Result<u32> {
        self.get_node_by_page(page)
            .ok_or_else(|| RankError::UnknownPage(page.to_string()))
    }

    /// Pages linked from `page`, sorted, empty if dangling
    pub fn outgoing(&self, page: &str) -> Result<Vec<&str>> {
        let node = self.node_id(page)?;
        Ok(self.neighbors(node).iter().map(|&n| self.page(n)).collect())
    }

    /// Number of pages linked from `page`
    pub fn out_degree(&self, page: &str) -> Result<usize> {
        Ok(self.degree(self.node_id(page)?) as usize)
    }

    /// Pages linking to `page`, sorted
    pub fn incoming(&self, page: &str) -> Result<Vec<&str>> {
        let node = self.node_id(page)?;
        Ok(self.in_neighbors(node).iter().map(|&n| self.page(n)).collect())
    }

    /// All pages in lexicographic order
    pub fn universe(&self) -> impl Iterator<Item = &str> + '_ {
        self.pages.iter().map(String::as_str)
    }

    /// Check if the graph is empty
    pub fn is_empty(&self) -> bool {
        self.num_nodes == 0
    }

    /// Get the total number of directed links
    pub fn num_links(&self) -> usize {
        self.col_idx.len()
    }

    /// Find dangling nodes (nodes with no outgoing links)
    pub fn dangling_nodes(&self) -> Vec<u32> {
        (0..self.num_nodes as u32)
            .filter(|&n| self.out_degree[n as usize] == 0)
            .collect()
    }
}

impl Default for CsrGraph {
    fn default() -> Self {
        Self {
            num_nodes: 0,
            row_ptr: vec![0],
            col_idx: Vec::new(),
            in_row_ptr: vec![0],
            in_col_idx: Vec::new(),
            out_degree: Vec::new(),
            pages: Vec::new(),
            page_to_id: FxHashMap::default(),
        }
    }
}

fn collect_corpus<I, P, L, T>(corpus: I) -> Vec<(String, Vec<String>)>
where
    I: IntoIterator<Item = (P, L)>,
    P: AsRef<str>,
    L: IntoIterator<Item = T>,
    T: AsRef<str>,
{
    corpus
        .into_iter()
        .map(|(page, links)| {
            let links = links.into_iter().map(|l| l.as_ref().to_string()).collect();
            (page.as_ref().to_string(), links)
        })
        .collect()
}
