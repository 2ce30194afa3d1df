// Shared prompt fragments used by more than one drafting step.
// Per-module templates live in drafting::prompts.

/// Appended to every host-language section prompt except Motivation.
pub const CLEAN_OUTPUT_RULES: &str = "
【绝对输出规则】
1. 只输出正文内容本身。
2. 严禁包含开场白、结尾语或结构说明。
3. 严禁使用 Markdown 格式（如加粗、列表符号、标题符号）。
4. 输出必须是纯文本。
5. 必须写成一个完整的、连贯的中文自然段。
";

/// Static translation style rules. Identical for every call; only the
/// spelling instruction next to it varies.
pub const TRANSLATION_RULES: &str = r#"
【Translation Task】
Translate the provided Chinese text into a professional, human-sounding Personal Statement paragraph.

【CRITICAL ANTI-AI STYLE GUIDE】
1. **KILL THE "AI SENTENCE PATTERN"**:
   - **ABSOLUTELY FORBIDDEN**: The pattern "I did X, **thereby/thus/enabling** me to do Y."
   - **SOLUTION**: Split into two sentences or use active verbs.

2. **SEMICOLONS (;) FOR FLOW**:
   - **MANDATORY**: When a sentence is grammatically complete but the thought is not finished (and leads directly into the next point), use a **semicolon (;)** to connect them.

3. **ADVERB CONTROL (ZERO TOLERANCE)**:
   - **STRICTLY PROHIBITED**: The combination of **Adverb + Verb** (e.g., "deeply analyze", "successfully completed") OR **Adverb + Adjective** (e.g., "perfectly align", "keenly interested").
   - **ACTION**: Delete the adverb entirely. Just use the verb or adjective.

4. **VOCABULARY PURGE**:
   - Use precise, simple words.

5. **ENHANCE COHESION & NARRATIVE FLOW (CRITICAL)**:
   - **MANDATORY**: You MUST actively add varied transitional phrases and logical connectors (e.g., "Furthermore," "In contrast," "Consequently," "Given this context") between sentences AND between paragraphs.
   - **GOAL**: Ensure the text flows smoothly as a unified narrative, not a disjointed list of sentences. The priority is reading fluency and the overall integrity of the article.

【BANNED WORDS LIST (Strictly Prohibited)】
[Verbs]: delve into, uncover, reveal, recognize, master, refine, cultivate, address, bridge, spearhead, pioneer, align with, stems from, underscore, highlight
[Adjectives/Adverbs]: instrumental, pivotal, seamless, systematically, rigorously, profoundly, deeply, acutely, keenly, comprehensively, perfectly, meticulously, proficiency, Additionally
[Nouns]: paradigm, trajectory, aspirations, vision, landscape, tapestry, realm, foundation, tenure, testament, commitment
[Connectors]: thereby, thus (when used with -ing), in turn
[Phrases]: "not only... but also", "Building on this", "rich tapestry", "testament to", "a wide array of", "my goal is to", "focus will be"

【Formatting】
1. Output as ONE single paragraph.
2. Output the ENTIRE text in **Bold**.
3. No Markdown headers.
"#;

/// Wraps shared background material (resume, material sheet) for a model call.
pub fn context_block(context: &str) -> String {
    format!("\n【参考文档/背景信息 (简历或素材表)】:\n{context}")
}
