#![allow(non_snake_case)]

use super::*;
use std::ptr;

#[test]
fn c_str_arg___valid_string___is_borrowed() {
    let value = unsafe { c_str_arg(c"hello".as_ptr(), "msg") }.unwrap();

    assert_eq!(value, "hello");
}

#[test]
fn c_str_arg___null___is_invalid_argument_naming_parameter() {
    let err = unsafe { c_str_arg(ptr::null(), "source_dir") }.unwrap_err();

    assert_eq!(err.error_code(), 10);
    assert!(err.to_string().contains("source_dir"));
}

#[test]
fn c_str_arg___invalid_utf8___is_invalid_argument() {
    let bytes = [0xC3u8, 0x28, 0x00];

    let err = unsafe { c_str_arg(bytes.as_ptr().cast(), "name") }.unwrap_err();

    assert!(matches!(err, SatchelError::InvalidArgument(_)));
}

#[test]
fn optional_c_str_arg___null___is_none() {
    let value = unsafe { optional_c_str_arg(ptr::null(), "override") }.unwrap();

    assert_eq!(value, None);
}

#[test]
fn path_arg___empty_string___is_invalid_argument() {
    let err = unsafe { path_arg(c"".as_ptr(), "archive_file") }.unwrap_err();

    assert_eq!(err.error_code(), 10);
}

#[test]
fn out_buffer___null_or_zero_capacity___is_none() {
    let mut storage = [0 as c_char; 4];

    assert!(unsafe { out_buffer(ptr::null_mut(), 16) }.is_none());
    assert!(unsafe { out_buffer(storage.as_mut_ptr(), 0) }.is_none());
}

#[test]
fn out_buffer___writes_reach_caller_memory() {
    let mut storage = [0 as c_char; 4];

    let slice = unsafe { out_buffer(storage.as_mut_ptr(), storage.len()) }.unwrap();
    slice[0] = b'x';

    assert_eq!(storage[0] as u8, b'x');
}

#[test]
fn lossy_c_str_arg___invalid_utf8___is_replaced() {
    let bytes = [b'o', b'k', 0xFF, 0x00];

    let value = unsafe { lossy_c_str_arg(bytes.as_ptr().cast()) }.unwrap();

    assert_eq!(value, "ok\u{FFFD}");
}

#[test]
fn lossy_c_str_arg___null___is_none() {
    assert!(unsafe { lossy_c_str_arg(ptr::null()) }.is_none());
}
