//! Prompt Library — pure template functions, one per drafting task.
//! Reuses cross-cutting fragments from llm_client::prompts.

use crate::drafting::modules::{Language, Spelling};
use crate::llm_client::prompts::{CLEAN_OUTPUT_RULES, TRANSLATION_RULES};

/// Motivation prompt template. Replace `{target}` before sending.
/// The reply must carry the four region tokens parsed by `markers::parse_motivation`.
const MOTIVATION_TEMPLATE: &str = r#"
【任务】撰写 Personal Statement 的 "申请动机" 部分。
【步骤 1：深度调研】
请先分析 {target} 所在领域的最新行业热点或学术趋势。
**请严格列出 3 个关键趋势 (Options)**，并严格按照以下 **HTML 格式** 输出（除文献/报告标题保留原文外，其余分析内容请使用**中文**）：

<div style="margin-bottom: 18px;">
    <div style="font-weight: bold; font-size: 14px; margin-bottom: 6px;">Option [X]: [Trend Title]</div>
    <ul style="margin: 0; padding-left: 18px; list-style-position: outside;">
        <li style="margin-bottom: 4px; line-height: 1.4;"><b>Source</b>: [Specific Paper Title/Report Name/News Source]</li>
        <li style="line-height: 1.4;"><b>Relevance</b>: [深度分析趋势与学生背景/项目的关联。解释为什么这个趋势对该学生重要，以及他们之前的经历（如具体项目、技能）如何与此契合。此部分必须详细展开。]</li>
    </ul>
</div>

【步骤 2：撰写正文】
基于上述趋势和学生素材，撰写一段中文申请动机。动机正文中不用出现具体信息源，但要体现出学生对行业趋势的理解和契合。
逻辑：学生过往经历 -> 观察到的行业痛点/趋势 -> 产生深造需求。
【严格输出格式】
请严格按照下方分隔符输出，不要包含其他内容：
[TRENDS_START]
(在此处列出 3 个调研趋势和来源，使用上述 HTML 格式)
[TRENDS_END]
[DRAFT_START]
(在此处撰写正文段落，纯文本，无Markdown)
[DRAFT_END]
"#;

/// Replace `{target}` and `{strategy}`.
const CAREER_GOAL_TEMPLATE: &str = r#"
【任务】撰写 "职业规划" (Career Goals) 部分。
【输入背景】
- 目标专业: {target}
- 顾问思路: {strategy}
【内容要求】
1. 规划硕士毕业后的路径（应届生视角）。
2. **必须包含**：具体的公司名字、具体的职位名称。
3. 将工作内容和未来继续学习方向融合在一段话中。
"#;

/// Replace `{target}`. The transcript travels as a media attachment.
const ACADEMIC_TEMPLATE: &str = r#"
【任务】撰写 "本科学习经历" (Academic Background) 部分。
【输入背景】
- 目标专业: {target}
- 核心依据 (成绩单): 见附带文件 (PDF或图片)
- 辅助参考 (学生素材/简历): 见附带文本
【核心原则：深度 > 数量】
不要罗列课程名。只精选与目标专业最强相关的核心课程进行深度描写。
【内容要求 - 必须包含细节】
1. **核心概念植入**：在描述每门课时，必须提及该课程具体的**核心概念、模型、算法或理论名称**。
2. **学术真实感**：结合学生素材，简述是如何理解或应用这些概念的。
3. **逻辑升华**：说明这些具体的知识点如何为你攻读 {target} 打下了坚实的学术基础。
4. **禁止**：禁止写成课程清单（List），必须是连贯的学术反思叙述。
"#;

/// Replace `{target}`, `{strategy}` and `{curriculum_block}`.
const WHY_SCHOOL_TEMPLATE: &str = r#"
【任务】撰写 "Why School" 部分。
【输入背景】
- 目标学校: {target}
- 顾问思路: {strategy}
{curriculum_block}
- 课程图片信息: 见附带图片
【内容要求】
1. 综合分析提供的文本列表和图片中的课程信息。
2. 从中挑选与学生背景或规划最相关的特定课程，不相关的课程不用写。
3. 若所提供信息包含课程名字与课程说明则参考，若仅有课程名字但无课程说明则搜索该课程（硕士水平）的教学内容，并据此阐述这些课程为何吸引学生及有何帮助，阐述时需深入到该课程具体教授的方法学及概念。
4. 课程阐述需有深度，有逻辑顺序或难度递进关系，体现出对课程内容的理解，而非简单罗列课程名称。
5. 语气朴素专业，议论为主。
"#;

/// Replace `{target}`.
const INTERNSHIP_TEMPLATE: &str = r#"
【任务】撰写 "实习/工作经历" (Professional Experience) 部分。
【输入背景】
- 学生素材: 见附带文本
- 目标专业: {target}
【内容要求】
1. 筛选最相关经历，按时间顺序逻辑串联。
2. 结构：背景 -> 职责 -> 技能 -> 动机。
3. 拒绝流水账，要有逻辑梳理和反思，要有与所申请专业的契合点和相关的感悟。
"#;

/// Host-language revision. Replace `{document}`.
const REVISE_CHINESE_TEMPLATE: &str = r#"
【任务】作为专业留学文书编辑，根据文中的嵌入式批注（中文方括号【】内的文字）修改文章。
【输入文本】
{document}
【执行步骤】
1. 扫描文中所有的中文方括号 `【】`。括号内的文字即为用户的修改指令。
2. 根据指令，修改括号紧邻的前文句子或段落。
3. **必须删除**原文中的括号及括号内的修改指令。
4. 保持未被批注的部分原封不动。
5. **高亮变化**：将**所有被修改后产生的新文字**用 Markdown 双星号 `**` 包裹（例如：**new text**），以便用户一眼看出改了哪里。
6. **必须保留**所有的分段标题行（例如 `--- 申请动机 ---`），不得修改或删除。
【输出要求】
只输出修改后的完整文章，严禁包含开场白、结尾语或修改说明。
"#;

/// Foreign-language revision. Replace `{document}` and `{style_guide}`.
const REVISE_ENGLISH_TEMPLATE: &str = r#"
【任务】你是一位顶尖的留学文书编辑。请根据用户在英文文本中嵌入的中文，对文章进行修改和润色。

【输入文本及批注】
{document}

【批注规则说明】
1.  **修改指令 `【中文内容】`**: 如果发现中文被中文方括号 `【】` 包围，这代表一条修改指令。请根据指令内容，修改它前面的英文句子。
2.  **翻译并插入**: 如果发现一段中文**没有被任何括号包围**，请将这段中文翻译成地道的英文，并无缝地插入到文本的那个位置。

【核心风格指令】
所有的修改和翻译都必须严格遵守以下【ANTI-AI STYLE GUIDE】。
{style_guide}

【输出要求】
1.  完成所有修改和翻译。
2.  **必须删除**原文中所有的中文内容和 `【】` 括号。
3.  **必须保留**所有的分段标题（例如 `--- Motivation ---`）。
4.  将**所有被修改或新增的英文部分**用 Markdown 双星号 `**` 包裹，以便用户识别。
5.  最终输出完整的、保留了分段结构的英文文本。
"#;

/// Header-pair request. Replace `{target}`.
const HEADER_TEMPLATE: &str = r#"
Task: Parse and format the university and major information from the string: "{target}".

Rules:
1. Identify the School Name and Major Name.
2. Create a Chinese Header: [School Name (Chinese, add '大学' if missing)] + [Major Name] + "个人陈述"
3. Create an English Header: "Personal Statement for " + [Major Name (English)] + "_" + [School Name (English)]

Example Input: 卡内基梅隆Master's in Health Care Analytics
Example Output: 卡内基梅隆大学Master's in Health Care Analytics个人陈述|Personal Statement for Master's in Health Care Analytics_Carnegie Mellon University

Output ONLY the two strings separated by a pipe symbol (|). Do not add any other text.
"#;

pub fn motivation(target: &str) -> String {
    fill(MOTIVATION_TEMPLATE, &[("target", target)])
}

pub fn career_goal(target: &str, strategy: &str) -> String {
    with_clean_rules(
        CAREER_GOAL_TEMPLATE,
        &[("target", target), ("strategy", strategy)],
    )
}

pub fn academic(target: &str) -> String {
    with_clean_rules(ACADEMIC_TEMPLATE, &[("target", target)])
}

/// The curriculum line is omitted entirely when no curriculum text was given.
pub fn why_school(target: &str, strategy: &str, curriculum_text: Option<&str>) -> String {
    let curriculum_block = curriculum_text
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(|t| format!("【目标课程文本列表】:{t}"))
        .unwrap_or_default();

    with_clean_rules(
        WHY_SCHOOL_TEMPLATE,
        &[
            ("target", target),
            ("strategy", strategy),
            ("curriculum_block", &curriculum_block),
        ],
    )
}

pub fn internship(target: &str) -> String {
    with_clean_rules(INTERNSHIP_TEMPLATE, &[("target", target)])
}

pub fn spelling_instruction(spelling: Spelling) -> &'static str {
    match spelling {
        Spelling::British => "\n【SPELLING RULE】: STRICTLY use British English spelling (e.g., colour, analyse, programme, centre).",
        Spelling::American => "\n【SPELLING RULE】: STRICTLY use American English spelling (e.g., color, analyze, program, center).",
    }
}

pub fn translation(text: &str, spelling: Spelling) -> String {
    format!(
        "{TRANSLATION_RULES}\n{}\n【Input Text】:\n{text}",
        spelling_instruction(spelling)
    )
}

pub fn revision(document: &str, language: Language) -> String {
    match language {
        Language::Chinese => fill(REVISE_CHINESE_TEMPLATE, &[("document", document)]),
        Language::English => fill(
            REVISE_ENGLISH_TEMPLATE,
            &[("style_guide", TRANSLATION_RULES), ("document", document)],
        ),
    }
}

pub fn header(target: &str) -> String {
    fill(HEADER_TEMPLATE, &[("target", target)])
}

fn with_clean_rules(template: &str, values: &[(&str, &str)]) -> String {
    format!("{}{CLEAN_OUTPUT_RULES}", fill(template, values))
}

/// Substitutes `{key}` placeholders in one left-to-right pass. Inserted values
/// are never rescanned, so user text that looks like a placeholder stays literal.
fn fill(template: &str, values: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        let hit = values.iter().find_map(|(key, value)| {
            after
                .strip_prefix(key)
                .and_then(|r| r.strip_prefix('}'))
                .map(|r| (*value, r))
        });
        match hit {
            Some((value, remainder)) => {
                out.push_str(value);
                rest = remainder;
            }
            None => {
                out.push('{');
                rest = after;
            }
        }
    }
    out.push_str(rest);
    out
}
