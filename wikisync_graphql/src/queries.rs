//! GraphQL documents sent to the Wiki.js endpoint.

pub const LOGIN: &str = r"
mutation login($email: String!, $password: String!) {
	auth {
		login(email: $email, password: $password) {
			jwt
			responseResult { succeeded errorCode slug message }
		}
	}
}";

pub const GET_PAGE: &str = r"
query getPage($id: Int!) {
	pages {
		single(id: $id) { id path locale title createdAt updatedAt }
	}
}";

pub const GET_PAGE_BY_PATH: &str = r"
query getPageByPath($path: String!, $locale: String!) {
	pages {
		singleByPath(path: $path, locale: $locale) {
			id path locale title description editor
			isPublished isPrivate createdAt updatedAt
			content scriptCss scriptJs
			tags { id tag title }
		}
	}
}";

pub const LIST_PAGES: &str = r"
query listPages($limit: Int) {
	pages {
		list(limit: $limit, orderBy: TITLE) {
			id path locale title description isPublished isPrivate createdAt updatedAt tags
		}
	}
}";

pub const CREATE_PAGE: &str = r"
mutation createPage(
	$content: String!, $description: String!, $editor: String!,
	$isPublished: Boolean!, $isPrivate: Boolean!, $locale: String!,
	$path: String!, $tags: [String]!, $title: String!
) {
	pages {
		create(
			content: $content, description: $description, editor: $editor,
			isPublished: $isPublished, isPrivate: $isPrivate, locale: $locale,
			path: $path, tags: $tags, title: $title
		) {
			responseResult { succeeded errorCode slug message }
			page { id }
		}
	}
}";

pub const UPDATE_PAGE: &str = r"
mutation updatePage(
	$id: Int!, $content: String, $editor: String, $isPrivate: Boolean,
	$isPublished: Boolean, $scriptCss: String, $scriptJs: String, $tags: [String]
) {
	pages {
		update(
			id: $id, content: $content, editor: $editor, isPrivate: $isPrivate,
			isPublished: $isPublished, scriptCss: $scriptCss, scriptJs: $scriptJs, tags: $tags
		) {
			responseResult { succeeded errorCode slug message }
			page { id }
		}
	}
}";

pub const DELETE_PAGE: &str = r"
mutation deletePage($id: Int!) {
	pages {
		delete(id: $id) { responseResult { succeeded errorCode slug message } }
	}
}";

pub const GET_TAGS: &str = r"
query getTags {
	pages {
		tags { id tag title createdAt updatedAt }
	}
}";
