//! Joining independent failures and searching for codes.

use std::error::Error as StdError;
use std::io;

use coded_errors::{
    as_error, as_error_dyn, definitions, error, has, has_dyn, join, Cause, Error, ErrorCode,
};

fn coded(code: ErrorCode, message: &str) -> Error {
    Error::with_options(message, [code])
}

// ============================================================================
// Join
// ============================================================================

#[test]
fn join_of_nothing_is_none() {
    assert!(join(Vec::<Error>::new()).is_none());
    assert!(join([None::<Error>, None]).is_none());
}

#[test]
fn join_of_one_is_identity() {
    let single = coded(definitions::NOT_FOUND, "only one");
    let joined = join([None, Some(single.clone()), None]).expect("one survivor");

    assert_eq!(joined, Cause::from(single));
    assert_eq!(joined.code(), &definitions::NOT_FOUND);
}

#[test]
fn join_of_one_opaque_stays_opaque() {
    let joined = join([io::Error::other("socket closed")]).expect("one survivor");
    assert!(joined.is_opaque());
    assert_eq!(joined.to_string(), "socket closed");
}

#[test]
fn join_of_two_builds_composite() {
    let e1 = coded(definitions::NOT_FOUND, "a");
    let e2 = Error::without_trace("b");

    let joined = join([e1.clone(), e2.clone()]).expect("two members").into_error();

    assert_eq!(joined.code(), &definitions::JOINED);
    assert_eq!(joined.message(), format!("[{}; {}]", e1, e2));
    assert_eq!(joined.message(), "[NotFoundError-40404: a; b]");
    assert_eq!(
        joined.nested_errors(),
        &[Cause::from(e1), Cause::from(e2)]
    );
    assert!(joined.stack_trace().is_none());
    assert_eq!(joined.http_status(), 500);
}

#[test]
fn join_mixes_structured_and_opaque_members() {
    let joined = join([
        Cause::from(coded(definitions::CONFLICT, "taken")),
        Cause::from(io::Error::other("timeout")),
    ])
    .expect("two members")
    .into_error();

    assert_eq!(joined.message(), "[ConflictError-40409: taken; timeout]");
    assert!(joined.nested_errors()[1].is_opaque());
}

// ============================================================================
// Has
// ============================================================================

#[test]
fn has_matches_top_level_code() {
    let err = coded(definitions::USER_NOT_FOUND, "missing");
    assert_eq!(has(&err, &definitions::USER_NOT_FOUND, false), Some(&err));
    assert_eq!(has(&err, &definitions::NOT_FOUND, true), None);
}

#[test]
fn has_recurses_into_joined_members() {
    let a = coded(definitions::NOT_FOUND, "a");
    let b = coded(definitions::CONFLICT, "b");
    let joined = join([a.clone(), b.clone()]).expect("joined");

    assert_eq!(joined.has(&definitions::CONFLICT, true), Some(&b));
    assert_eq!(joined.has(&definitions::NOT_FOUND, true), Some(&a));
    assert_eq!(joined.has(&definitions::FORBIDDEN, true), None);
    assert_eq!(joined.has(&definitions::CONFLICT, false), None);
    assert!(joined.has(&definitions::JOINED, false).is_some());
}

#[test]
fn has_finds_code_three_joins_deep() {
    let target = coded(definitions::RATE_LIMIT_EXCEEDED, "slow down");

    let level1 = join([coded(definitions::NOT_FOUND, "x"), target.clone()]).expect("level 1");
    let level2 = join([Cause::from(coded(definitions::CONFLICT, "y")), level1]).expect("level 2");
    let level3 = join([level2, Cause::from("plain")]).expect("level 3");

    assert_eq!(level3.has(&definitions::RATE_LIMIT_EXCEEDED, true), Some(&target));
    assert_eq!(level3.has(&definitions::RATE_LIMIT_EXCEEDED, false), None);
}

#[test]
fn has_first_match_wins_in_member_order() {
    let first = coded(definitions::CONFLICT, "first");
    let second = coded(definitions::CONFLICT, "second");
    let joined = join([first.clone(), second]).expect("joined").into_error();

    assert_eq!(joined.has(&definitions::CONFLICT, true), Some(&first));
}

#[test]
fn has_does_not_search_wrap_chains() {
    let inner = coded(definitions::NOT_FOUND, "inner");
    let outer = Error::wrap(inner, "outer").with_error_code(definitions::CONFLICT);

    assert_eq!(outer.has(&definitions::NOT_FOUND, true), None);
}

#[test]
fn has_ignores_opaque_causes() {
    let cause = Cause::from("not structured");
    assert_eq!(cause.has(&definitions::UNKNOWN, true), None);
}

// ============================================================================
// As
// ============================================================================

#[test]
fn as_error_on_causes() {
    let structured = Cause::from(coded(definitions::GONE, "gone"));
    assert_eq!(as_error(&structured).map(Error::code), Some(&definitions::GONE));

    let opaque = Cause::from("plain");
    assert!(as_error(&opaque).is_none());
}

#[test]
fn as_error_dyn_finds_library_error_behind_trait_object() {
    let boxed: Box<dyn StdError + Send + Sync> = Box::new(coded(definitions::CONFLICT, "boxed"));
    let found = as_error_dyn(boxed.as_ref()).expect("structured error");
    assert_eq!(found.message(), "boxed");
}

#[test]
fn as_error_dyn_looks_through_io_error() {
    let io_err = io::Error::other(coded(definitions::DB_ERROR, "pool exhausted"));
    let found = as_error_dyn(&io_err).expect("structured error inside io::Error");
    assert_eq!(found.code(), &definitions::DB_ERROR);

    assert!(has_dyn(&io_err, &definitions::DB_ERROR, false).is_some());
}

#[test]
fn join_keeps_library_errors_boxed_in_io_errors() {
    let boxed = io::Error::other(coded(definitions::DB_CONNECTION, "refused"));
    let joined = join([
        Cause::from(coded(definitions::CONFLICT, "taken")),
        Cause::from(boxed),
    ])
    .expect("two members");

    let found = joined
        .has(&definitions::DB_CONNECTION, true)
        .expect("member found through io::Error");
    assert_eq!(found.message(), "refused");
    assert!(!joined.into_error().nested_errors()[1].is_opaque());
}

#[test]
fn as_error_dyn_rejects_foreign_errors() {
    let io_err = io::Error::other("plain io");
    assert!(as_error_dyn(&io_err).is_none());
    assert!(has_dyn(&io_err, &definitions::UNKNOWN, true).is_none());
}

#[test]
fn joined_error_usable_as_std_error() {
    let joined = join([error!("a"), error!("b")]).expect("joined");
    let dyn_err: &(dyn StdError + 'static) = &joined;

    assert!(as_error_dyn(dyn_err).is_some_and(Error::is_joined));
    assert_eq!(dyn_err.source().map(ToString::to_string), Some("a".to_owned()));
}
