use crate::cli::SplitArgs;
use crate::error::{ValidationError, WriteaidError};
use crate::segment::segment;
use std::io::Read;

/// Segment a paragraph and print the result. Entirely offline.
pub fn execute(args: SplitArgs) -> Result<(), WriteaidError> {
    let paragraph = match args.paragraph {
        Some(p) => p,
        None => {
            let mut buf = String::new();
            std::io::stdin().read_to_string(&mut buf)?;
            buf
        }
    };

    let paragraph = paragraph.trim();
    if paragraph.is_empty() {
        return Err(ValidationError::MissingField("paragraph").into());
    }

    let sentences = segment(paragraph);

    if args.json {
        let doc = serde_json::json!({
            "paragraph": paragraph,
            "sentences": sentences,
            "sentence_count": sentences.len(),
        });
        println!(
            "{}",
            serde_json::to_string_pretty(&doc).map_err(crate::error::OutputError::Serialize)?
        );
    } else {
        println!("{} sentence(s):", sentences.len());
        for (i, sentence) in sentences.iter().enumerate() {
            println!("{:>3}. {}", i + 1, sentence);
        }
    }

    Ok(())
}
