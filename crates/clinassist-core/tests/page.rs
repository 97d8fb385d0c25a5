use clinassist_core::{CoreError, Page};

fn numbers(n: u32) -> Vec<u32> {
    (0..n).collect()
}

#[test]
fn first_page_of_many() {
    let page = Page::paginate(numbers(23), 0, 10).unwrap();
    assert_eq!(page.content, (0..10).collect::<Vec<_>>());
    assert_eq!(page.total_elements, 23);
    assert_eq!(page.total_pages, 3);
    assert!(page.first);
    assert!(!page.last);
    assert!(page.is_consistent());
}

#[test]
fn final_partial_page_is_last() {
    let page = Page::paginate(numbers(23), 2, 10).unwrap();
    assert_eq!(page.content, vec![20, 21, 22]);
    assert!(!page.first);
    assert!(page.last);
    assert!(page.is_consistent());
}

#[test]
fn exact_multiple_marks_last_on_final_page() {
    let page = Page::paginate(numbers(20), 1, 10).unwrap();
    assert_eq!(page.content.len(), 10);
    assert_eq!(page.total_pages, 2);
    assert!(page.last);
}

#[test]
fn page_past_the_end_is_empty_and_last() {
    let page = Page::paginate(numbers(5), 3, 10).unwrap();
    assert!(page.content.is_empty());
    assert!(page.last);
    assert_eq!(page.total_pages, 1);
    assert!(page.is_consistent());
}

#[test]
fn empty_collection() {
    let page = Page::paginate(Vec::<u32>::new(), 0, 10).unwrap();
    assert_eq!(page.total_pages, 0);
    assert!(page.first && page.last);
    assert!(page.is_consistent());
}

#[test]
fn zero_size_is_rejected() {
    let err = Page::paginate(numbers(3), 0, 0).unwrap_err();
    assert!(matches!(err, CoreError::InvalidPageSize(0)));
}

#[test]
fn content_never_exceeds_size() {
    for total in 0..30 {
        for size in 1..12 {
            for number in 0..5 {
                let page = Page::paginate(numbers(total), number, size).unwrap();
                assert!(page.content.len() <= size as usize);
                assert!(page.is_consistent(), "total={total} size={size} number={number}");
            }
        }
    }
}

#[test]
fn empty_helper_is_consistent() {
    let page: Page<u32> = Page::empty(0, 10);
    assert!(page.is_consistent());
    assert!(!page.has_next());
}

#[test]
fn deserializes_spring_page_payload() {
    let json = r#"{
        "content": [1, 2],
        "pageable": {"pageNumber": 0, "pageSize": 2},
        "totalElements": 5,
        "totalPages": 3,
        "size": 2,
        "number": 0,
        "first": true,
        "last": false,
        "numberOfElements": 2,
        "empty": false
    }"#;
    let page: Page<u32> = serde_json::from_str(json).unwrap();
    assert_eq!(page.content, vec![1, 2]);
    assert_eq!(page.total_pages, 3);
    assert!(page.is_consistent());
}

#[test]
fn map_keeps_metadata() {
    let page = Page::paginate(numbers(12), 1, 5).unwrap().map(|n| n * 2);
    assert_eq!(page.content, vec![10, 12, 14, 16, 18]);
    assert_eq!(page.number, 1);
    assert_eq!(page.total_elements, 12);
}
