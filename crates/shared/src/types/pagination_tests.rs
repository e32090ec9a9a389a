use super::*;

use rstest::rstest;

#[test]
fn test_page_request_default() {
    let request = PageRequest::default();
    assert_eq!(request.page, 1);
    assert_eq!(request.per_page, 20);
}

#[rstest]
#[case(1, 20, 0)]
#[case(2, 20, 20)]
#[case(3, 15, 30)]
#[case(0, 20, 0)]
fn test_page_request_offset(#[case] page: u32, #[case] per_page: u32, #[case] expected: u64) {
    assert_eq!(PageRequest::new(page, per_page).offset(), expected);
}

#[rstest]
#[case(50, 50)]
#[case(0, 1)]
#[case(500, 100)]
fn test_page_request_limit_is_clamped(#[case] per_page: u32, #[case] expected: u64) {
    assert_eq!(PageRequest::new(1, per_page).limit(), expected);
}

#[test]
fn test_page_response_new() {
    let data = vec![1, 2, 3];
    let response = PageResponse::new(data.clone(), PageRequest::new(1, 10), 3);

    assert_eq!(response.data, data);
    assert_eq!(response.meta.page, 1);
    assert_eq!(response.meta.per_page, 10);
    assert_eq!(response.meta.total, 3);
    assert_eq!(response.meta.total_pages, 1);
}

#[test]
fn test_page_response_pagination() {
    // 25 items, 10 per page -> 3 pages
    let response: PageResponse<i32> = PageResponse::new(vec![], PageRequest::new(1, 10), 25);
    assert_eq!(response.meta.total_pages, 3);
}

#[test]
fn test_page_response_empty() {
    let response: PageResponse<i32> = PageResponse::new(vec![], PageRequest::new(1, 10), 0);
    assert_eq!(response.meta.total_pages, 1);
}

#[test]
fn test_page_response_map_keeps_meta() {
    let response = PageResponse::new(vec![1, 2], PageRequest::new(2, 2), 4).map(|n| n * 10);
    assert_eq!(response.data, vec![10, 20]);
    assert_eq!(response.meta.page, 2);
    assert_eq!(response.meta.total_pages, 2);
}
