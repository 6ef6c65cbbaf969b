pub fn run() -> anyhow::Result<()> {
    println!("vqa {}", env!("CARGO_PKG_VERSION"));
    println!("Multiple-choice vehicle VQA generation for paired aerial images");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_output() {
        let result = run();
        assert!(result.is_ok());
    }
}
