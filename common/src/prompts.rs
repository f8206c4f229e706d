//! プロンプト生成モジュール
//!
//! - build_vision_prompt: 2段階推論Step1（視覚理解）用
//! - build_reasoning_prompt: 2段階推論Step2（テキスト推論）用
//! - build_direct_prompt: 1段階推論（画像から直接解答）用
//!
//! 問題文が中国語のため、プロンプトも中国語で記述する

/// テキスト推論の解答マーカー
pub const ANSWER_MARKER: &str = "答案：";

/// Step1プロンプト生成（画像の詳細理解）
pub fn build_vision_prompt(question: &str) -> String {
    format!(
        r#"
请仔细观察这张图片，并进行详细的分析和理解：

1. 图片内容描述：
   - 详细描述图片中的所有可见元素（文字、数字、图形、颜色、人物、物体等）
   - 分析图片的布局和结构
   - 识别图片中的关键信息

2. 逻辑关系分析：
   - 分析图片中各元素之间的关系
   - 识别可能的逻辑模式或规律
   - 理解图片要表达的含义

3. 问题相关性：
   问题：{question}
   - 分析问题与图片内容的关联性
   - 识别回答问题所需的关键信息
   - 进行初步的逻辑推理

请提供详细、准确的分析结果，这将用于后续的推理过程。
"#
    )
}

/// Step2プロンプト生成（視覚理解結果からの推論）
///
/// 末尾は必ず `答案：` で終わる。レスポンス側の前置きは
/// [`crate::parser::extract_answer`] が同じマーカーで切り落とす
pub fn build_reasoning_prompt(understanding: &str, question: &str) -> String {
    format!(
        r#"
基于以下图像理解结果，请回答问题：

图像理解结果：
{understanding}

问题：{question}

请根据图像理解结果中的信息，进行逻辑推理并给出准确答案。

要求：
1. 仔细分析图像理解结果中的关键信息
2. 结合问题进行逻辑推理
3. 给出简洁明确的答案
4. 只输出最终答案，不要解释过程

{ANSWER_MARKER}
"#
    )
}

/// 1段階推論プロンプト生成
pub fn build_direct_prompt(question: &str) -> String {
    format!("仅根据图片中的信息回答问题，不要输出任何与图片无关的内容。\n问题：{}", question)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vision_prompt_embeds_question() {
        let prompt = build_vision_prompt("图中按钮是什么颜色？");
        assert!(prompt.contains("问题：图中按钮是什么颜色？"));
        assert!(prompt.contains("逻辑关系分析"));
    }

    #[test]
    fn test_reasoning_prompt_ends_with_marker() {
        let prompt = build_reasoning_prompt("红色按钮", "按钮是什么颜色？");
        assert!(prompt.contains("图像理解结果：\n红色按钮"));
        assert!(prompt.trim_end().ends_with(ANSWER_MARKER));
    }

    #[test]
    fn test_direct_prompt() {
        assert_eq!(
            build_direct_prompt("几个人？"),
            "仅根据图片中的信息回答问题，不要输出任何与图片无关的内容。\n问题：几个人？"
        );
    }
}
