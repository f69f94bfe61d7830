//! Set-based query evaluation against a term-sorted archive.
//!
//! Each literal resolves to the union of the pointer lists of every
//! matching entry. AND intersects, OR unions, and the root converts the
//! final set to a sorted, deduplicated list. Set operations themselves
//! cannot fail; the only errors here come up from the index.

use std::collections::HashSet;
use std::io::{self, Read, Seek};

use crate::tsar::{match_equal, match_prefix, Index, Matcher};

use super::parser::Expr;

/// Evaluate a parsed tree, returning matching pointers sorted
/// ascending with no duplicates. An empty tree yields an empty result.
pub fn eval<R: Read + Seek>(tree: Option<&Expr>, index: &mut Index<R>) -> io::Result<Vec<u32>> {
    let Some(expr) = tree else {
        return Ok(Vec::new());
    };
    let set = eval_expr(expr, index)?;
    let mut res: Vec<u32> = set.into_iter().collect();
    res.sort_unstable();
    Ok(res)
}

fn eval_expr<R: Read + Seek>(expr: &Expr, index: &mut Index<R>) -> io::Result<HashSet<u32>> {
    match expr {
        Expr::Literal(q) => {
            let (needle, matcher): (&str, Matcher) = match q.strip_suffix(":*") {
                Some(stem) => (stem, match_prefix),
                None => (q.as_str(), match_equal),
            };
            let mut set = HashSet::new();
            for entry in index.find(needle, matcher)? {
                set.extend(entry.pointers);
            }
            Ok(set)
        }
        Expr::And(left, right) => {
            let a = eval_expr(left, index)?;
            let b = eval_expr(right, index)?;
            // iterate the smaller side
            let (small, large) = if a.len() <= b.len() { (a, b) } else { (b, a) };
            Ok(small.into_iter().filter(|p| large.contains(p)).collect())
        }
        Expr::Or(left, right) => {
            let mut a = eval_expr(left, index)?;
            let b = eval_expr(right, index)?;
            a.extend(b);
            Ok(a)
        }
    }
}
