use itertools::Itertools;

/// "Ann", "Ann and Bo", "Ann, Bo, and Cy".
pub fn join_names(names: &[String]) -> String {
    match names {
        [] => String::new(),
        [one] => one.clone(),
        [a, b] => format!("{} and {}", a, b),
        [rest @ .., last] => format!("{}, and {}", rest.iter().join(", "), last),
    }
}

pub fn is_are(n: usize) -> &'static str {
    match n {
        1 => "is",
        _ => "are",
    }
}
