use std::ffi::{CStr, CString};
use std::os::raw::c_char;

use chrono::{DateTime, Utc};
use objc2::runtime::{AnyClass, AnyObject};
use objc2::{class, msg_send};

pub fn nsstring_to_string(value: *mut AnyObject) -> Option<String> {
    if value.is_null() {
        return None;
    }
    let cstr: *const c_char = unsafe { msg_send![value, UTF8String] };
    if cstr.is_null() {
        return None;
    }
    let value = unsafe { CStr::from_ptr(cstr) };
    Some(value.to_string_lossy().to_string())
}

pub fn string_to_nsstring(value: &str) -> *mut AnyObject {
    let cstring = CString::new(value).unwrap_or_default();
    unsafe { msg_send![class!(NSString), stringWithUTF8String: cstring.as_ptr()] }
}

/// `absoluteString` of an `NSURL`
pub fn nsurl_to_string(url: *mut AnyObject) -> Option<String> {
    if url.is_null() {
        return None;
    }
    nsstring_to_string(unsafe { msg_send![url, absoluteString] })
}

pub fn nsdate_to_utc(date: *mut AnyObject) -> Option<DateTime<Utc>> {
    if date.is_null() {
        return None;
    }
    let seconds: f64 = unsafe { msg_send![date, timeIntervalSince1970] };
    let whole = seconds.floor();
    let nanos = ((seconds - whole) * 1e9).round().min(999_999_999.0) as u32;
    DateTime::from_timestamp(whole as i64, nanos)
}

pub fn utc_to_nsdate(instant: DateTime<Utc>) -> *mut AnyObject {
    let seconds = instant.timestamp() as f64 + f64::from(instant.timestamp_subsec_micros()) / 1e6;
    unsafe { msg_send![class!(NSDate), dateWithTimeIntervalSince1970: seconds] }
}

/// Elements of an `NSArray`; empty for nil
pub fn array_items(array: *mut AnyObject) -> Vec<*mut AnyObject> {
    if array.is_null() {
        return Vec::new();
    }
    let count: usize = unsafe { msg_send![array, count] };
    (0..count)
        .map(|index| -> *mut AnyObject { unsafe { msg_send![array, objectAtIndex: index] } })
        .filter(|item| !item.is_null())
        .collect()
}

pub fn mutable_array(items: &[*mut AnyObject]) -> *mut AnyObject {
    let array: *mut AnyObject = unsafe { msg_send![class!(NSMutableArray), array] };
    if array.is_null() {
        return array;
    }
    for item in items {
        let _: () = unsafe { msg_send![array, addObject: *item] };
    }
    array
}

/// Integer property read through key-value coding
///
/// Used for properties whose selector is a Rust keyword.
pub fn integer_for_key(object: *mut AnyObject, key: &str) -> Option<isize> {
    if object.is_null() {
        return None;
    }
    let key = string_to_nsstring(key);
    let number: *mut AnyObject = unsafe { msg_send![object, valueForKey: key] };
    if number.is_null() {
        return None;
    }
    let value: isize = unsafe { msg_send![number, integerValue] };
    Some(value)
}

pub fn lookup_class(name: &str) -> Option<&'static AnyClass> {
    AnyClass::get(name)
}
