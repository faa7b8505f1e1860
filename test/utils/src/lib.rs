use serde_json::json;

/// Body returned by the engine's `/invoke` route, with `count` placeholder
/// documents attached.
pub fn engine_answer_fixture(generation: &str, count: usize) -> String {
    let documents = (0..count)
        .map(|idx| {
            return format!("Document {idx} retrieved from the vector store.");
        })
        .collect::<Vec<String>>();

    return json!({
        "question": "What is the answer?",
        "generation": generation,
        "documents": documents,
        "step": "generate",
        "hallucination_grade": "useful",
        "retry_count": 0,
        "route": "vectorstore",
    })
    .to_string();
}

pub fn health_fixture() -> String {
    return json!({
        "status": "healthy",
        "version": "0.1.0",
        "env_check": {
            "google_api_key_set": true,
            "qdrant_url": "http://localhost:6333",
        },
    })
    .to_string();
}

pub fn markdown_fixture() -> &'static str {
    return r#"
# Summary

The answer is **42**, according to `deep_thought`.

- First point
- Second point

```python
print(42)
```

That's it!
"#
    .trim();
}
