use std::fmt;

pub type Res<T = ()> = Result<T, Box<dyn std::error::Error>>;

// コマンドライン引数 "-s 10" の値部分を取得
pub fn next_value<T>(it: &mut std::slice::Iter<'_, String>, opt: &str) -> Res<T>
where
    T: std::str::FromStr,
    T::Err: fmt::Display,
{
    let n = it.next().ok_or_else(|| format!("{}: value missing", opt))?;
    Ok(n.parse().map_err(|e| format!("{}: {} '{}'", opt, e, n))?)
}

pub fn unixtime_now() -> f64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as f64
        / 1000.0
}

// 標準入力から1行読み込む. EOFの場合はNone
pub fn prompt() -> Option<String> {
    use std::io::{stdin, stdout, Write};
    print!("> ");
    stdout().flush().ok()?;
    let mut buf = String::new();
    match stdin().read_line(&mut buf) {
        Ok(0) | Err(_) => None,
        Ok(_) => Some(buf),
    }
}

pub fn vec_to_string<T: fmt::Display>(v: &[T]) -> String {
    let vs: Vec<String> = v.iter().map(|x| format!("{}", x)).collect();
    "[".to_string() + &vs.join(", ") + "]"
}

#[test]
fn test_next_value() {
    let args: Vec<String> = ["10", "x"].iter().map(|s| s.to_string()).collect();
    let mut it = args.iter();
    let v: u64 = next_value(&mut it, "-s").unwrap();
    assert_eq!(v, 10);
    assert!(next_value::<u64>(&mut it, "-s").is_err());
    assert!(next_value::<u64>(&mut it, "-s").is_err());
}

#[test]
fn test_vec_to_string() {
    assert_eq!(vec_to_string(&[1, 2, 3]), "[1, 2, 3]");
    assert_eq!(vec_to_string::<i32>(&[]), "[]");
}
