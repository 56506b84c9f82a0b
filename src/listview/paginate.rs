//! Paginador

use serde::Serialize;

/// Porción de una lista ordenada mostrada en una página
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PageSlice<T> {
    pub page_items: Vec<T>,
    pub page_count: usize,
}

/// Número de páginas, nunca menor que 1. Un tamaño 0 se trata como 1.
pub fn page_count(len: usize, page_size: usize) -> usize {
    let size = page_size.max(1);
    len.div_ceil(size).max(1)
}

/// Devuelve `[(page-1)*size, page*size)` recortado a los límites de la lista.
/// Las páginas empiezan en 1; la página 0 se trata como la 1.
pub fn paginate<T: Clone>(ordered: &[T], page: usize, page_size: usize) -> PageSlice<T> {
    let size = page_size.max(1);
    let page = page.max(1);
    let start = (page - 1).saturating_mul(size).min(ordered.len());
    let end = start.saturating_add(size).min(ordered.len());

    PageSlice {
        page_items: ordered[start..end].to_vec(),
        page_count: page_count(ordered.len(), size),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_count() {
        assert_eq!(page_count(0, 10), 1);
        assert_eq!(page_count(10, 10), 1);
        assert_eq!(page_count(11, 10), 2);
        assert_eq!(page_count(25, 10), 3);
        assert_eq!(page_count(5, 0), 5);
    }

    #[test]
    fn test_last_page_is_clipped() {
        let items: Vec<u32> = (1..=25).collect();
        let slice = paginate(&items, 3, 10);
        assert_eq!(slice.page_items, vec![21, 22, 23, 24, 25]);
        assert_eq!(slice.page_count, 3);
    }

    #[test]
    fn test_page_past_the_end_is_empty() {
        let items: Vec<u32> = (1..=5).collect();
        let slice = paginate(&items, 4, 10);
        assert!(slice.page_items.is_empty());
        assert_eq!(slice.page_count, 1);
    }

    #[test]
    fn test_pages_reconstruct_the_list() {
        for len in [0usize, 1, 9, 10, 11, 37] {
            for size in [1usize, 3, 10] {
                let items: Vec<usize> = (0..len).collect();
                let count = paginate(&items, 1, size).page_count;
                let mut rebuilt = Vec::new();
                for page in 1..=count {
                    let slice = paginate(&items, page, size);
                    assert!(slice.page_items.len() <= size);
                    rebuilt.extend(slice.page_items);
                }
                assert_eq!(rebuilt, items, "len={len} size={size}");
            }
        }
    }
}
